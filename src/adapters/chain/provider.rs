//! RPC Provider and Wallet - alloy-rs 0.9 Connection Management
//!
//! Connects to the node that holds the acting account's keys and
//! exposes it twice: as a cloneable root provider for the
//! contract bindings, and as the `WalletConnection` port (network id,
//! accounts, `eth_sign`).

use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::RpcConfig;
use crate::ports::wallet::WalletConnection;

use super::contracts::ChainProvider;

/// Wallet backed by a JSON-RPC node.
///
/// Holds the boxed-transport root provider so `http`, `ws` and `ipc`
/// URLs all yield the same concrete type.
pub struct RpcWallet {
    /// Shared alloy provider.
    provider: ChainProvider,
    /// Account override; the node's first account otherwise.
    account: Option<Address>,
}

impl RpcWallet {
    /// Connect to the configured RPC endpoint.
    ///
    /// The URL comes from `config.toml` (never hardcoded). When an
    /// expected network is configured, a mismatch aborts startup.
    #[instrument(skip_all)]
    pub async fn connect(config: &RpcConfig, account: Option<Address>) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .on_builtin(&config.url)
            .await
            .context("Failed to connect to RPC endpoint")?;

        let network_id = provider
            .get_chain_id()
            .await
            .context("Failed to query network id")?;

        if let Some(expected) = config.expected_network_id {
            if network_id != expected {
                bail!("Expected network {expected}, node reports {network_id}");
            }
        }

        info!(network_id, "Connected to RPC");

        Ok(Self::from_provider(provider, account))
    }

    /// Wrap an existing provider.
    pub fn from_provider(provider: ChainProvider, account: Option<Address>) -> Self {
        Self { provider, account }
    }

    /// Shared provider for the contract bindings.
    pub fn provider(&self) -> ChainProvider {
        self.provider.clone()
    }
}

#[async_trait]
impl WalletConnection for RpcWallet {
    async fn network_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to query network id")
    }

    async fn account(&self) -> Result<Address> {
        if let Some(account) = self.account {
            return Ok(account);
        }

        let accounts = self
            .provider
            .get_accounts()
            .await
            .context("Failed to query accounts")?;

        accounts
            .first()
            .copied()
            .context("Wallet exposes no account (locked?)")
    }

    #[instrument(skip(self))]
    async fn sign_hash(&self, hash: B256, signer: Address) -> Result<Bytes> {
        self.provider
            .client()
            .request::<_, Bytes>("eth_sign", (signer, hash))
            .await
            .context("eth_sign failed")
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
