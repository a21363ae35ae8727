//! Order Sync Use Case - Relayer Listings into Client State
//!
//! Pulls orders and asset pairs from an `OrderSource` and dispatches
//! them into the `Store`: orders are merged by hash, products replace
//! the previous list. Runs as a polling loop until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::adapters::metrics::{ClientMetrics, HealthState};
use crate::domain::state::Action;
use crate::ports::relayer::OrderSource;

use super::store::Store;

/// Outcome of one sync round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
  /// Orders received from the source.
  pub received: usize,
  /// Orders in state after merging.
  pub orders_in_state: usize,
  /// Products now in state.
  pub products: usize,
}

/// Periodically mirrors a relayer into the store.
pub struct OrderSync<S: OrderSource> {
  source: Arc<S>,
  store: Arc<Store>,
  metrics: Arc<ClientMetrics>,
  health: Option<Arc<HealthState>>,
  interval: Duration,
}

impl<S: OrderSource> OrderSync<S> {
  /// Create a new sync loop polling every `interval`.
  pub fn new(source: Arc<S>, store: Arc<Store>, metrics: Arc<ClientMetrics>, interval: Duration) -> Self {
    Self {
      source,
      store,
      metrics,
      health: None,
      interval,
    }
  }

  /// Report relayer health into `health` after each round.
  pub fn with_health(mut self, health: Arc<HealthState>) -> Self {
    self.health = Some(health);
    self
  }

  /// Fetch once and dispatch the results.
  ///
  /// Products are only replaced when both listings were fetched, so a
  /// failed round leaves state untouched.
  #[instrument(skip(self))]
  pub async fn sync_once(&self) -> Result<SyncReport> {
    self.store.dispatch(Action::OrdersRequested);

    let (orders, products) = tokio::try_join!(
      async { self.source.fetch_orders().await.context("Failed to fetch relayer orders") },
      async { self.source.fetch_products().await.context("Failed to fetch relayer asset pairs") },
    )?;

    let received = orders.len();
    let product_count = products.len();

    self.store.dispatch(Action::ProductsSet(products));
    let state = self.store.dispatch(Action::OrdersAdded(orders));

    self.metrics.orders_synced.inc_by(received as u64);
    self
      .metrics
      .orders_in_state
      .set(i64::try_from(state.orders.len()).unwrap_or(i64::MAX));

    Ok(SyncReport {
      received,
      orders_in_state: state.orders.len(),
      products: product_count,
    })
  }

  /// Poll until shutdown. Failed rounds are logged and retried on the
  /// next tick.
  #[instrument(skip(self, shutdown_rx))]
  pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    info!(interval_secs = self.interval.as_secs(), "Order sync started");

    loop {
      match self.sync_once().await {
        Ok(report) => {
          self.set_health(true);
          info!(
            received = report.received,
            orders = report.orders_in_state,
            products = report.products,
            "Relayer sync complete"
          );
        }
        Err(e) => {
          self.set_health(false);
          self.metrics.sync_failures.inc();
          warn!(error = %e, "Relayer sync failed");
        }
      }

      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Order sync shutting down");
          return Ok(());
        }
        _ = tokio::time::sleep(self.interval) => {}
      }
    }
  }

  fn set_health(&self, healthy: bool) {
    if let Some(health) = &self.health {
      health.set_relayer_healthy(healthy);
    }
  }
}
