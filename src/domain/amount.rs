//! Amount coercion between human decimals and on-chain base units.
//!
//! Callers talk in `Decimal` (e.g. `1.5` ether); contracts take `U256`
//! base units (wei). Conversion is exact: an amount with more fractional
//! digits than the token supports is rejected rather than rounded.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Decimals of the native currency and of its wrapped token.
pub const ETHER_DECIMALS: u32 = 18;

/// Largest scale `rust_decimal` can represent.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Failure to coerce an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount must not be negative, got {0}")]
    Negative(Decimal),
    #[error("amount {amount} has more than {decimals} fractional digits")]
    TooPrecise { amount: Decimal, decimals: u32 },
    #[error("amount overflows 256 bits")]
    Overflow,
    #[error("base-unit amount {0} does not fit a decimal")]
    Unrepresentable(U256),
}

/// Convert a human amount into base units for a token with `decimals`.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(AmountError::TooPrecise { amount, decimals });
    }

    let mantissa = normalized.mantissa().unsigned_abs();
    let factor = U256::from(10u8)
        .checked_pow(U256::from(decimals - scale))
        .ok_or(AmountError::Overflow)?;

    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(AmountError::Overflow)
}

/// Convert base units back to a human amount.
pub fn from_base_units(raw: U256, decimals: u32) -> Result<Decimal, AmountError> {
    if decimals > MAX_DECIMAL_SCALE {
        return Err(AmountError::Unrepresentable(raw));
    }
    let value = i128::try_from(raw).map_err(|_| AmountError::Unrepresentable(raw))?;
    Decimal::try_from_i128_with_scale(value, decimals)
        .map(|d| d.normalize())
        .map_err(|_| AmountError::Unrepresentable(raw))
}

/// Ether → wei.
pub fn ether_to_wei(ether: Decimal) -> Result<U256, AmountError> {
    to_base_units(ether, ETHER_DECIMALS)
}

/// Serde helpers for `U256` as a base-10 string, the relayer wire format.
pub mod u256_dec {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(s.trim(), 10).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ether_to_wei_whole() {
        let wei = ether_to_wei(dec!(2)).unwrap();
        assert_eq!(wei, U256::from(2_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_ether_to_wei_fraction() {
        let wei = ether_to_wei(dec!(0.25)).unwrap();
        assert_eq!(wei, U256::from(250_000_000_000_000_000u128));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let raw = to_base_units(dec!(1.500000), 1).unwrap();
        assert_eq!(raw, U256::from(15u8));
    }

    #[test]
    fn test_too_precise_rejected() {
        let err = to_base_units(dec!(0.123), 2).unwrap_err();
        assert!(matches!(err, AmountError::TooPrecise { decimals: 2, .. }));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            ether_to_wei(dec!(-1)),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_zero_is_zero() {
        assert_eq!(ether_to_wei(Decimal::ZERO).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_from_base_units() {
        let d = from_base_units(U256::from(1_500_000u64), 6).unwrap();
        assert_eq!(d, dec!(1.5));
    }

    #[test]
    fn test_from_base_units_too_large() {
        assert!(from_base_units(U256::MAX, 18).is_err());
    }
}
