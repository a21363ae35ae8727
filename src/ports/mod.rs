//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `WalletConnection`: network id, current account, hash signing
//! - `ContractFactory` / `ContractWrappers`: exchange protocol bindings
//! - `OrderSource`: relayer order and asset-pair listings

pub mod contracts;
pub mod relayer;
pub mod wallet;
