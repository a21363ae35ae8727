//! DEX Exchange Client - Library Root
//!
//! Client for a 0x-v2-style exchange: a facade over the protocol
//! contracts with cached lookups and order pre-filtering, a relayer
//! client, and a reducer-driven store of orders, products and tokens.
//!
//! Re-exports all modules for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod usecases;

pub use error::{ClientError, ClientResult};
