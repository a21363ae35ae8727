//! Address normalization.
//!
//! Every address that crosses into the client (config, relayer payloads,
//! caller input) goes through `normalize_address` so comparisons and
//! cache keys never depend on checksum casing or a missing prefix.

use alloy::primitives::Address;
use thiserror::Error;

/// Rejected address input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address {input:?}: {reason}")]
pub struct AddressError {
    pub input: String,
    pub reason: &'static str,
}

/// Lower-case, strip any `0x`/`0X` prefix, validate, and re-prefix.
///
/// `"0xABCDEF..."`, `"abcdef..."` and `" 0Xabcdef... "` all normalize
/// to the same `"0xabcdef..."` string.
pub fn normalize_address(input: &str) -> Result<String, AddressError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    if body.len() != 40 {
        return Err(AddressError {
            input: input.to_string(),
            reason: "expected 40 hex characters",
        });
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError {
            input: input.to_string(),
            reason: "non-hex character",
        });
    }

    Ok(format!("0x{body}"))
}

/// Normalize and parse into an alloy `Address`.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let normalized = normalize_address(input)?;
    normalized.parse().map_err(|_| AddressError {
        input: input.to_string(),
        reason: "unparseable",
    })
}

/// Render an address in normalized (lower-case, prefixed) form.
pub fn format_address(address: &Address) -> String {
    format!("{address:#x}")
}
