//! Exchange Client - Facade over the Protocol Bindings
//!
//! One method per exchange operation. Every call resolves a fresh set
//! of contract bindings for the wallet's current network, resolves the
//! acting account when it needs one, coerces amounts, and forwards.
//! Binding errors come back unchanged as `ClientError::Upstream`.
//!
//! The only local logic:
//! - the two fillability filters (failed check = not fillable)
//! - market orders refusing to send when nothing survives the filters
//! - read-through caching of address lookups and filled amounts

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, U256};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::adapters::metrics::ClientMetrics;
use crate::domain::address::format_address;
use crate::domain::amount::ether_to_wei;
use crate::domain::{OrderHash, SignedOrder};
use crate::error::{ClientError, ClientResult};
use crate::ports::contracts::{ContractFactory, ContractWrappers, ForwarderFee, TxHash, TxOpts};
use crate::ports::wallet::WalletConnection;

use super::cache::{ReadThroughCache, render_key};

/// Contract and token addresses rarely change: 24 hours.
pub const ADDRESS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Filled amounts move with every trade: 60 seconds.
pub const FILLED_AMOUNT_TTL: Duration = Duration::from_secs(60);

const EXCHANGE_ADDRESS_KEY: &str = "exchange_address:{network_id}";
const ETHER_TOKEN_ADDRESS_KEY: &str = "ether_token_address:{network_id}";
const ZRX_TOKEN_ADDRESS_KEY: &str = "zrx_token_address:{network_id}";
const FILLED_TAKER_AMOUNT_KEY: &str = "filled_taker_amount:{network_id}:{order_hash}";

/// Caller-supplied options.
#[derive(Debug, Clone)]
pub struct ClientOptions {
  /// Acting account; the wallet's first account when `None`.
  pub account: Option<Address>,
  /// `should_validate` for all market buy/sell transactions.
  pub validate_market_orders: bool,
  pub address_ttl: Duration,
  pub filled_amount_ttl: Duration,
}

impl Default for ClientOptions {
  fn default() -> Self {
    Self {
      account: None,
      validate_market_orders: true,
      address_ttl: ADDRESS_TTL,
      filled_amount_ttl: FILLED_AMOUNT_TTL,
    }
  }
}

/// Facade over the exchange protocol for one wallet connection.
pub struct ExchangeClient<W: WalletConnection, F: ContractFactory> {
  wallet: Arc<W>,
  factory: Arc<F>,
  options: ClientOptions,
  cache: ReadThroughCache,
  metrics: Arc<ClientMetrics>,
}

impl<W: WalletConnection, F: ContractFactory> ExchangeClient<W, F> {
  /// Create a client with its own metrics registry.
  pub fn new(wallet: Arc<W>, factory: Arc<F>, options: ClientOptions) -> anyhow::Result<Self> {
    Ok(Self::with_metrics(
      wallet,
      factory,
      options,
      Arc::new(ClientMetrics::new()?),
    ))
  }

  /// Create a client reporting into a shared metrics registry.
  pub fn with_metrics(
    wallet: Arc<W>,
    factory: Arc<F>,
    options: ClientOptions,
    metrics: Arc<ClientMetrics>,
  ) -> Self {
    Self {
      wallet,
      factory,
      options,
      cache: ReadThroughCache::new(),
      metrics,
    }
  }

  pub fn options(&self) -> &ClientOptions {
    &self.options
  }

  pub fn metrics(&self) -> &Arc<ClientMetrics> {
    &self.metrics
  }

  /// Forget all cached lookups (call after a wallet/network switch).
  pub async fn clear_cache(&self) {
    self.cache.clear().await;
  }

  // ── Connection ─────────────────────────────────────────────

  /// Network id of the current wallet connection.
  pub async fn network_id(&self) -> ClientResult<u64> {
    Ok(self.wallet.network_id().await?)
  }

  /// Acting account: the configured override, else the wallet's.
  pub async fn account(&self) -> ClientResult<Address> {
    match self.options.account {
      Some(account) => Ok(account),
      None => Ok(self.wallet.account().await?),
    }
  }

  /// Fresh bindings for the wallet's current network.
  async fn contracts(&self) -> ClientResult<ContractWrappers> {
    let network_id = self.wallet.network_id().await?;
    Ok(self.factory.connect(network_id).await?)
  }

  // ── Cached lookups ─────────────────────────────────────────

  /// Exchange contract address (cached 24h per network).
  #[instrument(skip(self))]
  pub async fn exchange_address(&self) -> ClientResult<Address> {
    self
      .metrics
      .timed("exchange_address", async {
        let network_id = self.network_id().await?;
        let key = render_key(EXCHANGE_ADDRESS_KEY, &[("network_id", network_id.to_string().as_str())]);
        self
          .cache
          .get_or_fetch(&key, self.options.address_ttl, || async move {
            let contracts = self.factory.connect(network_id).await?;
            Ok::<_, ClientError>(contracts.exchange.address())
          })
          .await
      })
      .await
  }

  /// Wrapped-currency token address (cached 24h per network).
  #[instrument(skip(self))]
  pub async fn ether_token_address(&self) -> ClientResult<Address> {
    self
      .metrics
      .timed("ether_token_address", async {
        let network_id = self.network_id().await?;
        let key = render_key(ETHER_TOKEN_ADDRESS_KEY, &[("network_id", network_id.to_string().as_str())]);
        self
          .cache
          .get_or_fetch(&key, self.options.address_ttl, || async move {
            let contracts = self.factory.connect(network_id).await?;
            Ok::<_, ClientError>(contracts.ether_token.address())
          })
          .await
      })
      .await
  }

  /// Fee token (ZRX) address (cached 24h per network).
  #[instrument(skip(self))]
  pub async fn zrx_token_address(&self) -> ClientResult<Address> {
    self
      .metrics
      .timed("zrx_token_address", async {
        let network_id = self.network_id().await?;
        let key = render_key(ZRX_TOKEN_ADDRESS_KEY, &[("network_id", network_id.to_string().as_str())]);
        self
          .cache
          .get_or_fetch(&key, self.options.address_ttl, || async move {
            let contracts = self.factory.connect(network_id).await?;
            Ok::<_, ClientError>(contracts.exchange.zrx_token_address().await?)
          })
          .await
      })
      .await
  }

  /// Taker amount already filled for `order_hash` (cached 60s).
  #[instrument(skip(self), fields(order_hash = %order_hash))]
  pub async fn filled_taker_amount(&self, order_hash: OrderHash) -> ClientResult<U256> {
    self
      .metrics
      .timed("filled_taker_amount", async {
        let network_id = self.network_id().await?;
        let key = render_key(
          FILLED_TAKER_AMOUNT_KEY,
          &[
            ("network_id", network_id.to_string().as_str()),
            ("order_hash", order_hash.to_string().as_str()),
          ],
        );
        self
          .cache
          .get_or_fetch(&key, self.options.filled_amount_ttl, || async move {
            let contracts = self.factory.connect(network_id).await?;
            Ok::<_, ClientError>(contracts.exchange.filled_taker_amount(order_hash).await?)
          })
          .await
      })
      .await
  }

  // ── Signing ────────────────────────────────────────────────

  /// Sign an order hash with the acting account.
  #[instrument(skip(self), fields(order_hash = %order_hash))]
  pub async fn sign_order_hash(&self, order_hash: B256) -> ClientResult<Bytes> {
    self
      .metrics
      .timed("sign_order_hash", async {
        let signer = self.account().await?;
        Ok::<_, ClientError>(self.wallet.sign_hash(order_hash, signer).await?)
      })
      .await
  }

  // ── Single-order pass-throughs ─────────────────────────────

  /// Fill up to `taker_amount` of one order.
  #[instrument(skip(self, order), fields(taker_amount = %taker_amount))]
  pub async fn fill_order(&self, order: &SignedOrder, taker_amount: U256) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("fill_order", async {
        let contracts = self.contracts().await?;
        let taker = self.account().await?;
        let tx = contracts
          .exchange
          .fill_order(order, taker_amount, taker, TxOpts::validated(true))
          .await?;
        info!(tx = %tx, "Order fill submitted");
        Ok::<_, ClientError>(tx)
      })
      .await
  }

  /// Fill exactly `taker_amount` of one order or revert.
  #[instrument(skip(self, order), fields(taker_amount = %taker_amount))]
  pub async fn fill_or_kill_order(
    &self,
    order: &SignedOrder,
    taker_amount: U256,
  ) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("fill_or_kill_order", async {
        let contracts = self.contracts().await?;
        let taker = self.account().await?;
        Ok::<_, ClientError>(
          contracts
            .exchange
            .fill_or_kill_order(order, taker_amount, taker, TxOpts::validated(true))
            .await?,
        )
      })
      .await
  }

  /// Fill several orders, each with its own taker amount.
  #[instrument(skip(self, orders, taker_amounts), fields(count = orders.len()))]
  pub async fn batch_fill_orders(
    &self,
    orders: &[SignedOrder],
    taker_amounts: &[U256],
  ) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("batch_fill_orders", async {
        let contracts = self.contracts().await?;
        let taker = self.account().await?;
        Ok::<_, ClientError>(
          contracts
            .exchange
            .batch_fill_orders(orders, taker_amounts, taker, TxOpts::validated(true))
            .await?,
        )
      })
      .await
  }

  /// Cancel an order made by the acting account.
  #[instrument(skip(self, order))]
  pub async fn cancel_order(&self, order: &SignedOrder) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("cancel_order", async {
        let contracts = self.contracts().await?;
        let maker = self.account().await?;
        let tx = contracts
          .exchange
          .cancel_order(order, maker, TxOpts::default())
          .await?;
        info!(tx = %tx, maker = %format_address(&maker), "Order cancel submitted");
        Ok::<_, ClientError>(tx)
      })
      .await
  }

  // ── Wrapped currency ───────────────────────────────────────

  /// Wrap `ether` of native currency.
  #[instrument(skip(self), fields(ether = %ether))]
  pub async fn deposit(&self, ether: Decimal) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("deposit", async {
        let amount = ether_to_wei(ether)?;
        let contracts = self.contracts().await?;
        let account = self.account().await?;
        Ok::<_, ClientError>(
          contracts
            .ether_token
            .deposit(amount, account, TxOpts::default())
            .await?,
        )
      })
      .await
  }

  /// Unwrap `ether` of wrapped currency.
  #[instrument(skip(self), fields(ether = %ether))]
  pub async fn withdraw(&self, ether: Decimal) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("withdraw", async {
        let amount = ether_to_wei(ether)?;
        let contracts = self.contracts().await?;
        let account = self.account().await?;
        Ok::<_, ClientError>(
          contracts
            .ether_token
            .withdraw(amount, account, TxOpts::default())
            .await?,
        )
      })
      .await
  }

  // ── Filters ────────────────────────────────────────────────

  /// Orders the exchange currently accepts as fillable, input order kept.
  ///
  /// Each order is checked concurrently; a failed check drops the order
  /// and is not reported. Only failing to build the bindings is an error.
  #[instrument(skip(self, orders), fields(count = orders.len()))]
  pub async fn filter_fillable_orders(&self, orders: &[SignedOrder]) -> ClientResult<Vec<SignedOrder>> {
    let contracts = self.contracts().await?;
    let checks = orders
      .iter()
      .map(|order| contracts.exchange.validate_order_fillable(order));
    let results = join_all(checks).await;
    Ok(self.keep_passing("fillable", orders, results))
  }

  /// Orders `taker` could fill `taker_amount` of right now, input order kept.
  #[instrument(skip(self, orders), fields(count = orders.len(), taker_amount = %taker_amount))]
  pub async fn filter_test_order_fill(
    &self,
    orders: &[SignedOrder],
    taker_amount: U256,
    taker: Address,
  ) -> ClientResult<Vec<SignedOrder>> {
    let contracts = self.contracts().await?;
    let checks = orders
      .iter()
      .map(|order| contracts.exchange.validate_fill_order(order, taker_amount, taker));
    let results = join_all(checks).await;
    Ok(self.keep_passing("test_fill", orders, results))
  }

  /// Zip orders with their check results and keep the passing ones.
  fn keep_passing(
    &self,
    filter: &'static str,
    orders: &[SignedOrder],
    results: Vec<anyhow::Result<()>>,
  ) -> Vec<SignedOrder> {
    let kept: Vec<SignedOrder> = orders
      .iter()
      .zip(results)
      .filter_map(|(order, result)| match result {
        Ok(()) => Some(order.clone()),
        Err(e) => {
          debug!(filter, salt = %order.salt, error = %e, "Order dropped by filter");
          self.metrics.filter_rejections.with_label_values(&[filter]).inc();
          None
        }
      })
      .collect();

    debug!(filter, input = orders.len(), kept = kept.len(), "Filter applied");
    kept
  }

  /// Both filters in sequence; empty result is a terminal error.
  async fn usable_orders(
    &self,
    orders: &[SignedOrder],
    fill_amount: U256,
    taker: Address,
  ) -> ClientResult<Vec<SignedOrder>> {
    let fillable = self.filter_fillable_orders(orders).await?;
    let usable = self.filter_test_order_fill(&fillable, fill_amount, taker).await?;
    if usable.is_empty() {
      return Err(ClientError::NoFillableOrders);
    }
    Ok(usable)
  }

  // ── Market orders ──────────────────────────────────────────

  /// Buy `maker_amount` of the maker asset across the usable `orders`.
  #[instrument(skip(self, orders), fields(count = orders.len(), maker_amount = %maker_amount))]
  pub async fn market_buy(&self, orders: &[SignedOrder], maker_amount: U256) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("market_buy", async {
        let taker = self.account().await?;
        let usable = self.usable_orders(orders, maker_amount, taker).await?;
        let contracts = self.contracts().await?;
        let tx = contracts
          .exchange
          .market_buy_orders(&usable, maker_amount, taker, self.market_opts())
          .await?;
        info!(tx = %tx, orders = usable.len(), "Market buy submitted");
        Ok::<_, ClientError>(tx)
      })
      .await
  }

  /// Sell `taker_amount` of the taker asset across the usable `orders`.
  #[instrument(skip(self, orders), fields(count = orders.len(), taker_amount = %taker_amount))]
  pub async fn market_sell(&self, orders: &[SignedOrder], taker_amount: U256) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("market_sell", async {
        let taker = self.account().await?;
        let usable = self.usable_orders(orders, taker_amount, taker).await?;
        let contracts = self.contracts().await?;
        let tx = contracts
          .exchange
          .market_sell_orders(&usable, taker_amount, taker, self.market_opts())
          .await?;
        info!(tx = %tx, orders = usable.len(), "Market sell submitted");
        Ok::<_, ClientError>(tx)
      })
      .await
  }

  /// Buy `maker_amount` of the maker asset paying up to `ether`.
  #[instrument(skip(self, orders, fee), fields(count = orders.len(), ether = %ether))]
  pub async fn market_buy_with_eth(
    &self,
    orders: &[SignedOrder],
    maker_amount: U256,
    ether: Decimal,
    fee: ForwarderFee,
  ) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("market_buy_with_eth", async {
        let eth_amount = ether_to_wei(ether)?;
        let taker = self.account().await?;
        let usable = self.usable_orders(orders, maker_amount, taker).await?;
        let contracts = self.contracts().await?;
        let tx = contracts
          .forwarder
          .market_buy_orders_with_eth(&usable, maker_amount, taker, eth_amount, fee, self.market_opts())
          .await?;
        info!(tx = %tx, orders = usable.len(), "Market buy with ETH submitted");
        Ok::<_, ClientError>(tx)
      })
      .await
  }

  /// Spend `ether` buying the maker asset of the usable `orders`.
  #[instrument(skip(self, orders, fee), fields(count = orders.len(), ether = %ether))]
  pub async fn market_sell_with_eth(
    &self,
    orders: &[SignedOrder],
    ether: Decimal,
    fee: ForwarderFee,
  ) -> ClientResult<TxHash> {
    self
      .metrics
      .timed("market_sell_with_eth", async {
        let eth_amount = ether_to_wei(ether)?;
        let taker = self.account().await?;
        let usable = self.usable_orders(orders, eth_amount, taker).await?;
        let contracts = self.contracts().await?;
        let tx = contracts
          .forwarder
          .market_sell_orders_with_eth(&usable, taker, eth_amount, fee, self.market_opts())
          .await?;
        info!(tx = %tx, orders = usable.len(), "Market sell with ETH submitted");
        Ok::<_, ClientError>(tx)
      })
      .await
  }

  fn market_opts(&self) -> TxOpts {
    TxOpts::validated(self.options.validate_market_orders)
  }

  /// Check if the wallet connection is healthy.
  pub async fn is_healthy(&self) -> bool {
    self.wallet.is_healthy().await
  }
}
