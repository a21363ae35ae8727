//! Client-side exchange state and its reducer.
//!
//! `reduce` is pure: it never mutates the input state and never fails.
//! The `Store` use case owns the current snapshot and serializes
//! dispatches; this module only defines how one action transforms one
//! snapshot into the next.

use std::collections::HashSet;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::market::{Product, Token};
use super::order::{OrderHash, OrderRecord};

/// Snapshot of everything the client knows about the market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeState {
    /// Unique by `order_hash`, in first-seen order.
    pub orders: Vec<OrderRecord>,
    pub products: Vec<Product>,
    pub tokens: Vec<Token>,
}

/// Everything that can be dispatched to the store.
///
/// Only the first three variants touch `ExchangeState`; the rest are
/// observed by other subscribers and leave it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Merge orders by hash; records already present are kept.
    OrdersAdded(Vec<OrderRecord>),
    /// Replace the product list.
    ProductsSet(Vec<Product>),
    /// Replace the token list.
    TokensSet(Vec<Token>),
    /// The wallet switched network or account.
    WalletChanged {
        network_id: u64,
        account: Option<Address>,
    },
    /// A relayer refresh was started.
    OrdersRequested,
}

impl Action {
    /// Short label for logs and metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OrdersAdded(_) => "orders_added",
            Self::ProductsSet(_) => "products_set",
            Self::TokensSet(_) => "tokens_set",
            Self::WalletChanged { .. } => "wallet_changed",
            Self::OrdersRequested => "orders_requested",
        }
    }
}

/// Produce the next state for `action`.
pub fn reduce(state: &ExchangeState, action: &Action) -> ExchangeState {
    match action {
        Action::OrdersAdded(incoming) => ExchangeState {
            orders: union_by_hash(&state.orders, incoming),
            ..state.clone()
        },
        Action::ProductsSet(products) => ExchangeState {
            products: products.clone(),
            ..state.clone()
        },
        Action::TokensSet(tokens) => ExchangeState {
            tokens: tokens.clone(),
            ..state.clone()
        },
        Action::WalletChanged { .. } | Action::OrdersRequested => state.clone(),
    }
}

/// Stable union of `existing ++ incoming` keyed by order hash: the first
/// record seen for a hash wins.
fn union_by_hash(existing: &[OrderRecord], incoming: &[OrderRecord]) -> Vec<OrderRecord> {
    let mut seen: HashSet<OrderHash> = HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .iter()
        .chain(incoming)
        .filter(|record| seen.insert(record.order_hash))
        .cloned()
        .collect()
}

impl ExchangeState {
    /// Look up an order by hash.
    pub fn order(&self, hash: &OrderHash) -> Option<&OrderRecord> {
        self.orders.iter().find(|r| r.order_hash == *hash)
    }

    /// Orders trading either direction of `product`.
    pub fn orders_for_product<'a>(
        &'a self,
        product: &'a Product,
    ) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        self.orders
            .iter()
            .filter(move |r| product.matches(&r.order.maker_asset_data, &r.order.taker_asset_data))
    }

    /// Case-insensitive token lookup.
    pub fn token_by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }
}
