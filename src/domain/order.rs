//! Order domain types.
//!
//! A `SignedOrder` mirrors the 0x v2 order struct field-for-field so that
//! adapters can hand it to the exchange contract without reshaping.
//! An `OrderRecord` is what the client keeps in state: the order plus the
//! hash the relayer (or exchange) reported for it.
//!
//! Amounts are base units (`U256`), never floats.

use alloy::primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::amount::u256_dec;

/// Order hash as reported by the exchange / relayer.
pub type OrderHash = B256;

/// A maker-signed offer to swap `maker_asset_amount` of the maker asset
/// for `taker_asset_amount` of the taker asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    pub maker_address: Address,
    /// Zero address means anyone may fill.
    pub taker_address: Address,
    pub fee_recipient_address: Address,
    pub sender_address: Address,
    #[serde(with = "u256_dec")]
    pub maker_asset_amount: U256,
    #[serde(with = "u256_dec")]
    pub taker_asset_amount: U256,
    #[serde(with = "u256_dec")]
    pub maker_fee: U256,
    #[serde(with = "u256_dec")]
    pub taker_fee: U256,
    #[serde(with = "u256_dec")]
    pub expiration_time_seconds: U256,
    #[serde(with = "u256_dec")]
    pub salt: U256,
    pub maker_asset_data: Bytes,
    pub taker_asset_data: Bytes,
    pub exchange_address: Address,
    pub signature: Bytes,
}

/// An order held in client-side state, keyed by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_hash: OrderHash,
    pub order: SignedOrder,
    /// Relayer hint of what is left to fill, if it sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_fillable_taker_amount: Option<U256>,
}

impl OrderRecord {
    pub fn new(order_hash: OrderHash, order: SignedOrder) -> Self {
        Self {
            order_hash,
            order,
            remaining_fillable_taker_amount: None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::order;
    use super::*;

    #[test]
    fn test_order_json_uses_decimal_amounts() {
        let json = serde_json::to_value(order(7)).unwrap();
        assert_eq!(json["makerAssetAmount"], "1000");
        assert_eq!(json["salt"], "7");
        let back: SignedOrder = serde_json::from_value(json).unwrap();
        assert_eq!(back, order(7));
    }
}
