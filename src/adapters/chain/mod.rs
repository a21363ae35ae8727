//! Chain Adapters - Exchange Protocol on an EVM Chain
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC wallet connection (network id, accounts, `eth_sign`)
//! - Exchange, ether token and forwarder bindings
//! - Per-network deployment lookup from config

pub mod bindings;
pub mod contracts;
pub mod provider;

pub use contracts::{ChainContractFactory, ChainProvider};
pub use provider::RpcWallet;
