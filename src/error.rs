//! Client error type.
//!
//! Wallet and contract failures pass through untouched as `Upstream`;
//! the other variants are conditions the client itself detects.

use thiserror::Error;

use crate::domain::address::AddressError;
use crate::domain::amount::AmountError;

/// Errors returned by the exchange client.
#[derive(Debug, Error)]
pub enum ClientError {
  /// Filtering left nothing to trade against.
  #[error("No fillable orders available for this trade")]
  NoFillableOrders,

  #[error(transparent)]
  InvalidAddress(#[from] AddressError),

  #[error(transparent)]
  InvalidAmount(#[from] AmountError),

  /// The protocol has no deployment configured for this network.
  #[error("exchange protocol is not deployed on network {0}")]
  UnknownNetwork(u64),

  /// Failure from the wallet connection or a contract binding.
  #[error(transparent)]
  Upstream(anyhow::Error),
}

impl From<anyhow::Error> for ClientError {
  /// Adapters may raise a `ClientError` through `anyhow`; keep its variant.
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<ClientError>() {
      Ok(inner) => inner,
      Err(err) => Self::Upstream(err),
    }
  }
}

/// Result alias used across the facade.
pub type ClientResult<T> = Result<T, ClientError>;
