//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! All contract addresses and endpoints are externalized here;
//! nothing is hardcoded in the domain layer.

pub mod loader;

use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Deserializer};

use crate::adapters::relayer::RelayerClientConfig;
use crate::domain::{parse_address, Token};

/// Top-level client configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the client connects to anything.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Client identity and behaviour.
  pub client: ClientConfig,
  /// Chain RPC endpoint.
  pub rpc: RpcConfig,
  /// Protocol deployments, one per network.
  pub networks: Vec<NetworkConfig>,
  /// Standard Relayer API endpoint.
  pub relayer: RelayerConfig,
  /// Token list seeded into state at startup.
  #[serde(default)]
  pub tokens: Vec<TokenConfig>,
  /// Metrics and monitoring.
  pub metrics: MetricsConfig,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Human-readable client name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Acting account; the wallet's first account when absent.
  #[serde(default, deserialize_with = "optional_address")]
  pub account: Option<Address>,
  /// Dry-run market orders before sending them.
  #[serde(default = "default_true")]
  pub validate_market_orders: bool,
}

/// RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
  /// JSON-RPC URL of the node holding the account keys.
  pub url: String,
  /// Refuse to start when the node reports another network.
  pub expected_network_id: Option<u64>,
}

/// Addresses of the protocol contracts on one network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
  pub network_id: u64,
  #[serde(default)]
  pub name: String,
  #[serde(deserialize_with = "address")]
  pub exchange: Address,
  #[serde(deserialize_with = "address")]
  pub ether_token: Address,
  #[serde(deserialize_with = "address")]
  pub forwarder: Address,
}

/// Relayer endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayerConfig {
  /// Base URL without the `/v2` suffix.
  pub base_url: String,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Retries on 429 / 5xx / transport errors.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// First backoff delay; doubles per attempt.
  #[serde(default = "default_retry_delay_ms")]
  pub retry_base_delay_ms: u64,
  /// Seconds between sync rounds.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_seconds: u64,
  /// Maximum in-flight requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Records requested per page.
  #[serde(default = "default_per_page")]
  pub per_page: u64,
}

impl RelayerConfig {
  /// HTTP client settings for `network_id`.
  pub fn client_config(&self, network_id: u64) -> RelayerClientConfig {
    RelayerClientConfig {
      base_url: self.base_url.clone(),
      network_id,
      timeout: Duration::from_millis(self.timeout_ms),
      max_concurrent: self.max_concurrent,
      max_retries: self.max_retries,
      retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
      per_page: self.per_page,
      ..RelayerClientConfig::default()
    }
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_seconds)
  }
}

/// Token list entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
  #[serde(deserialize_with = "address")]
  pub address: Address,
  pub symbol: String,
  pub name: String,
  pub decimals: u32,
}

impl From<&TokenConfig> for Token {
  fn from(token: &TokenConfig) -> Self {
    Self {
      address: token.address,
      symbol: token.symbol.clone(),
      name: token.name.clone(),
      decimals: token.decimals,
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl AppConfig {
  /// Deployment configured for `network_id`.
  pub fn network(&self, network_id: u64) -> Option<&NetworkConfig> {
    self.networks.iter().find(|n| n.network_id == network_id)
  }
}

// Addresses are accepted in any case, with or without `0x`.

fn address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
  let raw = String::deserialize(deserializer)?;
  parse_address(&raw).map_err(serde::de::Error::custom)
}

fn optional_address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Address>, D::Error> {
  match Option::<String>::deserialize(deserializer)? {
    Some(raw) if !raw.trim().is_empty() => parse_address(&raw).map(Some).map_err(serde::de::Error::custom),
    _ => Ok(None),
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_timeout_ms() -> u64 {
  30_000
}

fn default_max_retries() -> u32 {
  3
}

fn default_retry_delay_ms() -> u64 {
  200
}

fn default_poll_interval() -> u64 {
  30
}

fn default_max_concurrent() -> usize {
  4
}

fn default_per_page() -> u64 {
  100
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}
