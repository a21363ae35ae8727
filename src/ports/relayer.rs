//! Order Source Port - Relayer Listing Interface
//!
//! Where orders and tradable pairs come from before they are merged
//! into client state.

use async_trait::async_trait;

use crate::domain::{OrderRecord, Product};

/// Trait for order-book sources (Standard Relayer API and friends).
#[async_trait]
pub trait OrderSource: Send + Sync + 'static {
  /// All currently listed orders for the configured network.
  async fn fetch_orders(&self) -> anyhow::Result<Vec<OrderRecord>>;

  /// All asset pairs the source trades.
  async fn fetch_products(&self) -> anyhow::Result<Vec<Product>>;

  /// Check if the source is reachable.
  async fn is_healthy(&self) -> bool;
}
