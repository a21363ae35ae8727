//! Standard Relayer API Adapter
//!
//! Fetches orders and asset pairs from a 0x Standard Relayer API v2
//! endpoint and implements the `OrderSource` port.
//!
//! Sub-modules:
//! - `client`: HTTP client with concurrency limit, retries, pagination
//! - `types`: API response type definitions

pub mod client;
pub mod types;

pub use client::{RelayerClient, RelayerClientConfig};
