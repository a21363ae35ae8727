//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `ExchangeClient`: facade over the exchange protocol bindings
//! - `Store`: serialized dispatch around the state reducer
//! - `OrderSync`: relayer listings into client state
//! - `ReadThroughCache`: TTL memoization used by the facade

pub mod cache;
pub mod exchange_client;
pub mod order_sync;
pub mod store;

pub use cache::ReadThroughCache;
pub use exchange_client::{ClientOptions, ExchangeClient};
pub use order_sync::{OrderSync, SyncReport};
pub use store::Store;
