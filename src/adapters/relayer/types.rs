//! Standard Relayer API v2 Response Types
//!
//! Serialization types for the paginated `/v2/orders` and
//! `/v2/asset_pairs` endpoints. Amounts arrive as base-10 strings.

use alloy::primitives::{B256, U256};
use serde::Deserialize;

use crate::domain::{OrderRecord, Product, SignedOrder};

/// Paginated envelope shared by all list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  /// Total records across all pages.
  pub total: u64,
  /// 1-based page number.
  pub page: u64,
  pub per_page: u64,
  pub records: Vec<T>,
}

impl<T> Page<T> {
  /// Whether pages after this one may hold more records.
  pub fn has_more(&self, collected: u64) -> bool {
    !self.records.is_empty() && collected < self.total
  }
}

/// One entry of `/v2/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrder {
  pub order: SignedOrder,
  #[serde(default)]
  pub meta_data: ApiOrderMetaData,
}

/// Relayer-specific metadata; every field is optional in v2.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrderMetaData {
  pub order_hash: Option<B256>,
  pub remaining_fillable_taker_asset_amount: Option<String>,
}

impl ApiOrder {
  /// Convert into a state record; `None` when the relayer sent no hash.
  pub fn into_record(self) -> Option<OrderRecord> {
    let order_hash = self.meta_data.order_hash?;
    let remaining = self
      .meta_data
      .remaining_fillable_taker_asset_amount
      .and_then(|s| U256::from_str_radix(s.trim(), 10).ok());

    Some(OrderRecord {
      order_hash,
      order: self.order,
      remaining_fillable_taker_amount: remaining,
    })
  }
}

pub type OrdersPage = Page<ApiOrder>;
pub type AssetPairsPage = Page<Product>;

#[cfg(test)]
mod tests {
  use super::*;

  const ORDERS_PAGE: &str = r#"{
    "total": 2,
    "page": 1,
    "perPage": 100,
    "records": [
      {
        "order": {
          "makerAddress": "0x9e56625509c2f60af937f23b7b532600390e8c8b",
          "takerAddress": "0x0000000000000000000000000000000000000000",
          "feeRecipientAddress": "0xb046140686d052fff581f63f8136cce132e857da",
          "senderAddress": "0x0000000000000000000000000000000000000000",
          "makerAssetAmount": "10000000000000000",
          "takerAssetAmount": "20000000000000000",
          "makerFee": "0",
          "takerFee": "0",
          "expirationTimeSeconds": "1532560590",
          "salt": "1532559225",
          "makerAssetData": "0xf47261b0000000000000000000000000e41d2489571d322189246dafa5ebde1f4699f498",
          "takerAssetData": "0xf47261b0000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
          "exchangeAddress": "0x12459c951127e0c374ff9105dda097662a027093",
          "signature": "0x012761a3ed31b43c8780e905a260a35faefcc527be7516aa11c0256729b5b351bc33"
        },
        "metaData": {
          "orderHash": "0x3bbcc35a0a8f5a5f8b8f1c7a3e1fb0b0e2d0d8c0b1e2f3a4b5c6d7e8f9a0b1c2",
          "remainingFillableTakerAssetAmount": "5000"
        }
      },
      {
        "order": {
          "makerAddress": "0x9e56625509c2f60af937f23b7b532600390e8c8b",
          "takerAddress": "0x0000000000000000000000000000000000000000",
          "feeRecipientAddress": "0xb046140686d052fff581f63f8136cce132e857da",
          "senderAddress": "0x0000000000000000000000000000000000000000",
          "makerAssetAmount": "1",
          "takerAssetAmount": "2",
          "makerFee": "0",
          "takerFee": "0",
          "expirationTimeSeconds": "1532560590",
          "salt": "42",
          "makerAssetData": "0x",
          "takerAssetData": "0x",
          "exchangeAddress": "0x12459c951127e0c374ff9105dda097662a027093",
          "signature": "0x00"
        },
        "metaData": {}
      }
    ]
  }"#;

  #[test]
  fn test_orders_page_parses() {
    let page: OrdersPage = serde_json::from_str(ORDERS_PAGE).unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.per_page, 100);
    assert_eq!(page.records.len(), 2);
    assert_eq!(
      page.records[0].order.maker_asset_amount,
      U256::from(10_000_000_000_000_000u64)
    );
  }

  #[test]
  fn test_record_without_hash_is_skipped() {
    let page: OrdersPage = serde_json::from_str(ORDERS_PAGE).unwrap();
    let records: Vec<_> = page.records.into_iter().filter_map(ApiOrder::into_record).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(
      records[0].remaining_fillable_taker_amount,
      Some(U256::from(5000u64))
    );
  }

  #[test]
  fn test_has_more() {
    let page: OrdersPage = serde_json::from_str(ORDERS_PAGE).unwrap();
    assert!(!page.has_more(2));
    assert!(page.has_more(1));
  }
}
