//! State Store - Serialized Dispatch Around the Reducer
//!
//! Holds the current `ExchangeState` snapshot in a `watch` channel.
//! `dispatch` runs the reducer under the channel's lock, so concurrent
//! dispatches apply one after another and every subscriber sees whole
//! snapshots. Each action is also broadcast for observers that care
//! about actions the reducer ignores (e.g. `WalletChanged`).

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::domain::state::{Action, ExchangeState, reduce};

/// Capacity of the action broadcast; slow observers lag, never block.
const ACTION_CHANNEL_CAPACITY: usize = 256;

/// Owner of the client-side exchange state.
pub struct Store {
  state_tx: watch::Sender<Arc<ExchangeState>>,
  action_tx: broadcast::Sender<Action>,
}

impl Default for Store {
  fn default() -> Self {
    Self::new(ExchangeState::default())
  }
}

impl Store {
  /// Create a store seeded with `initial`.
  pub fn new(initial: ExchangeState) -> Self {
    let (state_tx, _) = watch::channel(Arc::new(initial));
    let (action_tx, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
    Self {
      state_tx,
      action_tx,
    }
  }

  /// Apply `action` and return the resulting snapshot.
  ///
  /// Subscribers are only woken when the snapshot actually changed.
  pub fn dispatch(&self, action: Action) -> Arc<ExchangeState> {
    let mut result = None;

    let changed = self.state_tx.send_if_modified(|state| {
      let next = reduce(state, &action);
      if next == **state {
        result = Some(Arc::clone(state));
        return false;
      }
      let next = Arc::new(next);
      *state = Arc::clone(&next);
      result = Some(next);
      true
    });

    debug!(kind = action.kind(), changed, "Action dispatched");

    // No observers is fine.
    let _ = self.action_tx.send(action);

    result.unwrap_or_else(|| self.state())
  }

  /// Current snapshot.
  pub fn state(&self) -> Arc<ExchangeState> {
    Arc::clone(&self.state_tx.borrow())
  }

  /// Receiver woken on every state change.
  pub fn subscribe(&self) -> watch::Receiver<Arc<ExchangeState>> {
    self.state_tx.subscribe()
  }

  /// Receiver of every dispatched action.
  pub fn subscribe_actions(&self) -> broadcast::Receiver<Action> {
    self.action_tx.subscribe()
  }
}
