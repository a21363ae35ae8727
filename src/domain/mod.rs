//! Domain layer - Core exchange-client models.
//!
//! Pure types and functions: orders, products, tokens, the state reducer,
//! and the address / amount coercions every caller goes through.
//! No I/O here (hexagonal architecture inner ring).

pub mod address;
pub mod amount;
pub mod market;
pub mod order;
pub mod state;

// Re-export core types for convenience
pub use address::{normalize_address, parse_address};
pub use amount::{ether_to_wei, to_base_units};
pub use market::{AssetSpec, Product, Token};
pub use order::{OrderHash, OrderRecord, SignedOrder};
pub use state::{Action, ExchangeState, reduce};
