//! Products (tradable asset pairs) and token descriptors.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::amount::u256_dec;

/// Trading limits for one side of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSpec {
    /// Proxy-encoded asset data (e.g. ERC-20 proxy id + token address).
    pub asset_data: Bytes,
    #[serde(with = "u256_dec")]
    pub min_amount: U256,
    #[serde(with = "u256_dec")]
    pub max_amount: U256,
    /// Decimal places the relayer quotes this asset with.
    pub precision: u32,
}

/// A tradable pair as advertised by a relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "assetDataA")]
    pub base: AssetSpec,
    #[serde(rename = "assetDataB")]
    pub quote: AssetSpec,
}

impl Product {
    /// Whether an order trading `maker` for `taker` asset data belongs to
    /// this pair, in either direction.
    pub fn matches(&self, maker: &Bytes, taker: &Bytes) -> bool {
        (self.base.asset_data == *maker && self.quote.asset_data == *taker)
            || (self.base.asset_data == *taker && self.quote.asset_data == *maker)
    }
}

/// A token the client knows how to display and convert amounts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
}
