//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails (including malformed addresses)
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    networks = config.networks.len(),
    tokens = config.tokens.len(),
    relayer = %config.relayer.base_url,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - At least one deployment, with unique network ids and no zero addresses
/// - An expected network that actually has a deployment
/// - Non-empty endpoints and sane relayer limits
/// - Unique token symbols
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(!config.rpc.url.is_empty(), "RPC URL must not be empty");

  // Deployments
  anyhow::ensure!(
    !config.networks.is_empty(),
    "At least one [[networks]] deployment must be configured"
  );

  let mut seen = HashSet::new();
  for network in &config.networks {
    anyhow::ensure!(
      seen.insert(network.network_id),
      "Network {} is configured more than once",
      network.network_id
    );
    for (name, addr) in [
      ("exchange", network.exchange),
      ("ether_token", network.ether_token),
      ("forwarder", network.forwarder),
    ] {
      anyhow::ensure!(
        addr != Address::ZERO,
        "Network {} has zero {name} address",
        network.network_id
      );
    }
  }

  if let Some(expected) = config.rpc.expected_network_id {
    anyhow::ensure!(
      config.network(expected).is_some(),
      "expected_network_id {expected} has no [[networks]] deployment"
    );
  }

  // Relayer
  anyhow::ensure!(
    !config.relayer.base_url.is_empty(),
    "Relayer base URL must not be empty"
  );
  anyhow::ensure!(
    config.relayer.max_concurrent > 0,
    "relayer.max_concurrent must be positive"
  );
  anyhow::ensure!(
    config.relayer.poll_interval_seconds > 0,
    "relayer.poll_interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.relayer.per_page > 0 && config.relayer.per_page <= 1000,
    "relayer.per_page must be in (0, 1000], got {}",
    config.relayer.per_page
  );

  // Tokens
  let mut symbols = HashSet::new();
  for token in &config.tokens {
    anyhow::ensure!(
      symbols.insert(token.symbol.to_ascii_uppercase()),
      "Token symbol {} is configured more than once",
      token.symbol
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloy::primitives::address;

  const VALID: &str = r#"
[client]
name = "test-client"
account = "0X5409ED021D9299BF6814279A6A1411A7E866A631"

[rpc]
url = "http://localhost:8545"
expected_network_id = 50

[[networks]]
network_id = 50
name = "ganache"
exchange = "48bacb9266a570d521063ef5dd96e61686dbe788"
ether_token = "0x0b1ba0af832d7c05fd64161e0db78e85978e8082"
forwarder = "0xb69e673309512a9d726f87304c6984054f87a93b"

[relayer]
base_url = "http://localhost:3000"

[[tokens]]
address = "0x0b1ba0af832d7c05fd64161e0db78e85978e8082"
symbol = "WETH"
name = "Wrapped Ether"
decimals = 18

[metrics]
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_parse_valid_config_normalizes_addresses() {
    let config = parse_config(VALID).unwrap();

    assert_eq!(
      config.client.account,
      Some(address!("5409ed021d9299bf6814279a6a1411a7e866a631"))
    );
    let network = config.network(50).unwrap();
    assert_eq!(network.exchange, address!("48bacb9266a570d521063ef5dd96e61686dbe788"));
    assert!(config.client.validate_market_orders);
    assert_eq!(config.relayer.max_retries, 3);
    assert_eq!(config.metrics.health_port, 8080);
  }

  #[test]
  fn test_relayer_client_config_uses_network() {
    let config = parse_config(VALID).unwrap();
    let client = config.relayer.client_config(50);
    assert_eq!(client.network_id, 50);
    assert_eq!(client.timeout.as_millis(), 30_000);
  }

  #[test]
  fn test_malformed_address_is_rejected() {
    let bad = VALID.replace("48bacb9266a570d521063ef5dd96e61686dbe788", "0x1234");
    assert!(parse_config(&bad).is_err());
  }

  #[test]
  fn test_expected_network_must_be_deployed() {
    let bad = VALID.replace("expected_network_id = 50", "expected_network_id = 1");
    let err = parse_config(&bad).unwrap_err();
    assert!(err.to_string().contains("expected_network_id"));
  }

  #[test]
  fn test_duplicate_token_symbol_is_rejected() {
    let dup = format!(
      "{VALID}\n[[tokens]]\naddress = \"0x0b1ba0af832d7c05fd64161e0db78e85978e8082\"\nsymbol = \"weth\"\nname = \"again\"\ndecimals = 18\n"
    );
    assert!(parse_config(&dup).is_err());
  }
}
