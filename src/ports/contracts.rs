//! Contract Ports - Exchange Protocol Bindings
//!
//! Defines the traits for the three protocol contracts the client
//! forwards to (Exchange, EtherToken, Forwarder) and the factory that
//! builds a fresh set of them for the current network.
//!
//! The protocol's own rules (signature checks, fill math, fees) live
//! behind these traits; callers only see "ok" or an error.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::domain::{OrderHash, SignedOrder};

/// Hash of a submitted transaction.
pub type TxHash = B256;

/// Per-transaction options forwarded to the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOpts {
  /// Dry-run the call (`eth_call`) before sending it.
  pub should_validate: bool,
  /// Explicit gas limit; estimated when `None`.
  pub gas_limit: Option<u64>,
}

impl Default for TxOpts {
  fn default() -> Self {
    Self {
      should_validate: true,
      gas_limit: None,
    }
  }
}

impl TxOpts {
  /// Options with validation switched on or off.
  pub fn validated(should_validate: bool) -> Self {
    Self {
      should_validate,
      ..Self::default()
    }
  }
}

/// Affiliate fee paid through the forwarder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwarderFee {
  /// Orders used to buy the ZRX needed for taker fees.
  pub fee_orders: Vec<SignedOrder>,
  /// Fee percentage in 18-decimal fixed point.
  pub fee_percentage: U256,
  /// Recipient of the affiliate fee.
  pub fee_recipient: Address,
}

/// Trait for the exchange contract binding.
#[async_trait]
pub trait ExchangeContract: Send + Sync + 'static {
  /// Deployed address of the exchange.
  fn address(&self) -> Address;

  /// Address of the fee token (ZRX) the exchange charges in.
  async fn zrx_token_address(&self) -> anyhow::Result<Address>;

  /// Taker amount already filled for an order.
  async fn filled_taker_amount(&self, order_hash: OrderHash) -> anyhow::Result<U256>;

  /// Succeeds iff the exchange currently considers the order fillable.
  async fn validate_order_fillable(&self, order: &SignedOrder) -> anyhow::Result<()>;

  /// Succeeds iff `taker` could fill `taker_amount` of the order right now.
  async fn validate_fill_order(
    &self,
    order: &SignedOrder,
    taker_amount: U256,
    taker: Address,
  ) -> anyhow::Result<()>;

  /// Fill up to `taker_amount` of a single order.
  async fn fill_order(
    &self,
    order: &SignedOrder,
    taker_amount: U256,
    taker: Address,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;

  /// Fill exactly `taker_amount` or revert.
  async fn fill_or_kill_order(
    &self,
    order: &SignedOrder,
    taker_amount: U256,
    taker: Address,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;

  /// Fill several orders, each with its own taker amount.
  async fn batch_fill_orders(
    &self,
    orders: &[SignedOrder],
    taker_amounts: &[U256],
    taker: Address,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;

  /// Buy `maker_amount` of the maker asset across `orders`.
  async fn market_buy_orders(
    &self,
    orders: &[SignedOrder],
    maker_amount: U256,
    taker: Address,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;

  /// Sell `taker_amount` of the taker asset across `orders`.
  async fn market_sell_orders(
    &self,
    orders: &[SignedOrder],
    taker_amount: U256,
    taker: Address,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;

  /// Cancel an order; must be sent by its maker.
  async fn cancel_order(
    &self,
    order: &SignedOrder,
    maker: Address,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;
}

/// Trait for the wrapped native currency (WETH) binding.
#[async_trait]
pub trait EtherTokenContract: Send + Sync + 'static {
  /// Deployed address of the wrapped-currency token.
  fn address(&self) -> Address;

  /// Wrap `amount` wei.
  async fn deposit(&self, amount: U256, from: Address, opts: TxOpts) -> anyhow::Result<TxHash>;

  /// Unwrap `amount` wei.
  async fn withdraw(&self, amount: U256, from: Address, opts: TxOpts) -> anyhow::Result<TxHash>;
}

/// Trait for the forwarder binding (fills paid in native currency).
#[async_trait]
pub trait ForwarderContract: Send + Sync + 'static {
  /// Deployed address of the forwarder.
  fn address(&self) -> Address;

  /// Buy `maker_amount` of the maker asset paying with `eth_amount` wei.
  async fn market_buy_orders_with_eth(
    &self,
    orders: &[SignedOrder],
    maker_amount: U256,
    taker: Address,
    eth_amount: U256,
    fee: ForwarderFee,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;

  /// Spend all of `eth_amount` wei buying the maker asset.
  async fn market_sell_orders_with_eth(
    &self,
    orders: &[SignedOrder],
    taker: Address,
    eth_amount: U256,
    fee: ForwarderFee,
    opts: TxOpts,
  ) -> anyhow::Result<TxHash>;
}

/// One freshly built set of protocol bindings.
#[derive(Clone)]
pub struct ContractWrappers {
  pub exchange: Arc<dyn ExchangeContract>,
  pub ether_token: Arc<dyn EtherTokenContract>,
  pub forwarder: Arc<dyn ForwarderContract>,
}

impl std::fmt::Debug for ContractWrappers {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ContractWrappers")
      .field("exchange", &self.exchange.address())
      .field("ether_token", &self.ether_token.address())
      .field("forwarder", &self.forwarder.address())
      .finish()
  }
}

/// Trait for building protocol bindings for a network.
#[async_trait]
pub trait ContractFactory: Send + Sync + 'static {
  /// Build bindings for `network_id`.
  ///
  /// # Errors
  /// Returns error if the protocol is not deployed on that network.
  async fn connect(&self, network_id: u64) -> anyhow::Result<ContractWrappers>;
}
