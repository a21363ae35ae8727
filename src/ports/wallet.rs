//! Wallet Connection Port - Blockchain Connection Interface
//!
//! The single injection point between the client and the chain: which
//! network we are on, which account acts, and signing on its behalf.

use alloy::primitives::{Address, B256, Bytes};
use async_trait::async_trait;

/// Trait for the caller's blockchain connection.
///
/// Implementors typically wrap an RPC provider whose node (or browser
/// wallet) holds the account keys.
#[async_trait]
pub trait WalletConnection: Send + Sync + 'static {
  /// Network id of the currently connected chain.
  async fn network_id(&self) -> anyhow::Result<u64>;

  /// Account that signs and sends transactions.
  ///
  /// # Errors
  /// Returns error if the wallet exposes no account (locked wallet).
  async fn account(&self) -> anyhow::Result<Address>;

  /// Sign an order hash with `signer` (`eth_sign` semantics).
  async fn sign_hash(&self, hash: B256, signer: Address) -> anyhow::Result<Bytes>;

  /// Check if the connection is healthy.
  async fn is_healthy(&self) -> bool;
}
