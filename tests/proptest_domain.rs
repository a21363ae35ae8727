//! Property-Based Tests - Reducer and Filter Invariants
//!
//! Uses `proptest` to verify that the order merge and the fillability
//! filters keep their guarantees across random inputs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use proptest::prelude::*;
use rust_decimal::Decimal;

use dex_exchange_client::domain::amount::{from_base_units, to_base_units};
use dex_exchange_client::domain::{
    normalize_address, reduce, Action, ExchangeState, OrderHash, OrderRecord, SignedOrder,
};
use dex_exchange_client::ports::contracts::{
    ContractFactory, ContractWrappers, EtherTokenContract, ExchangeContract, ForwarderContract,
    ForwarderFee, TxHash, TxOpts,
};
use dex_exchange_client::ports::wallet::WalletConnection;
use dex_exchange_client::usecases::{ClientOptions, ExchangeClient};

// ── Fixtures ──────────────────────────────────────────────

fn order(salt: u64) -> SignedOrder {
    SignedOrder {
        maker_address: Address::repeat_byte(0x11),
        taker_address: Address::ZERO,
        fee_recipient_address: Address::ZERO,
        sender_address: Address::ZERO,
        maker_asset_amount: U256::from(1_000u64),
        taker_asset_amount: U256::from(2_000u64),
        maker_fee: U256::ZERO,
        taker_fee: U256::ZERO,
        expiration_time_seconds: U256::from(1_900_000_000u64),
        salt: U256::from(salt),
        maker_asset_data: Bytes::new(),
        taker_asset_data: Bytes::new(),
        exchange_address: Address::repeat_byte(0xee),
        signature: Bytes::new(),
    }
}

/// Records keyed by a small hash space so collisions are common;
/// the salt tells same-hash records apart.
fn records() -> impl Strategy<Value = Vec<OrderRecord>> {
    prop::collection::vec((0u8..16, any::<u64>()), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(tag, salt)| OrderRecord::new(B256::repeat_byte(tag), order(salt)))
            .collect()
    })
}

struct FakeWallet;

#[async_trait]
impl WalletConnection for FakeWallet {
    async fn network_id(&self) -> anyhow::Result<u64> {
        Ok(1)
    }
    async fn account(&self) -> anyhow::Result<Address> {
        Ok(Address::repeat_byte(0xaa))
    }
    async fn sign_hash(&self, _hash: B256, _signer: Address) -> anyhow::Result<Bytes> {
        anyhow::bail!("not used")
    }
    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Exchange rejecting every order whose salt is in `rejected`.
struct SaltExchange {
    rejected: HashSet<u64>,
}

impl SaltExchange {
    fn check(&self, order: &SignedOrder) -> anyhow::Result<()> {
        if self.rejected.contains(&order.salt.to::<u64>()) {
            anyhow::bail!("rejected")
        }
        Ok(())
    }
}

#[async_trait]
impl ExchangeContract for SaltExchange {
    fn address(&self) -> Address {
        Address::ZERO
    }
    async fn zrx_token_address(&self) -> anyhow::Result<Address> {
        anyhow::bail!("not used")
    }
    async fn filled_taker_amount(&self, _order_hash: OrderHash) -> anyhow::Result<U256> {
        anyhow::bail!("not used")
    }
    async fn validate_order_fillable(&self, order: &SignedOrder) -> anyhow::Result<()> {
        self.check(order)
    }
    async fn validate_fill_order(&self, order: &SignedOrder, _: U256, _: Address) -> anyhow::Result<()> {
        self.check(order)
    }
    async fn fill_order(&self, _: &SignedOrder, _: U256, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn fill_or_kill_order(&self, _: &SignedOrder, _: U256, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn batch_fill_orders(&self, _: &[SignedOrder], _: &[U256], _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn market_buy_orders(&self, _: &[SignedOrder], _: U256, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn market_sell_orders(&self, _: &[SignedOrder], _: U256, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn cancel_order(&self, _: &SignedOrder, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
}

struct NoEtherToken;

#[async_trait]
impl EtherTokenContract for NoEtherToken {
    fn address(&self) -> Address {
        Address::ZERO
    }
    async fn deposit(&self, _: U256, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn withdraw(&self, _: U256, _: Address, _: TxOpts) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
}

struct NoForwarder;

#[async_trait]
impl ForwarderContract for NoForwarder {
    fn address(&self) -> Address {
        Address::ZERO
    }
    async fn market_buy_orders_with_eth(
        &self,
        _: &[SignedOrder],
        _: U256,
        _: Address,
        _: U256,
        _: ForwarderFee,
        _: TxOpts,
    ) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
    async fn market_sell_orders_with_eth(
        &self,
        _: &[SignedOrder],
        _: Address,
        _: U256,
        _: ForwarderFee,
        _: TxOpts,
    ) -> anyhow::Result<TxHash> {
        anyhow::bail!("not used")
    }
}

struct FixedFactory(ContractWrappers);

#[async_trait]
impl ContractFactory for FixedFactory {
    async fn connect(&self, _network_id: u64) -> anyhow::Result<ContractWrappers> {
        Ok(self.0.clone())
    }
}

fn client_rejecting(rejected: HashSet<u64>) -> ExchangeClient<FakeWallet, FixedFactory> {
    let contracts = ContractWrappers {
        exchange: Arc::new(SaltExchange { rejected }),
        ether_token: Arc::new(NoEtherToken),
        forwarder: Arc::new(NoForwarder),
    };
    ExchangeClient::new(
        Arc::new(FakeWallet),
        Arc::new(FixedFactory(contracts)),
        ClientOptions::default(),
    )
    .unwrap()
}

// ── Reducer Properties ──────────────────────────────────────

proptest! {
    /// Merged orders never repeat a hash, and every hash seen survives.
    #[test]
    fn merge_is_union_by_hash(existing in records(), incoming in records()) {
        let state = reduce(&ExchangeState::default(), &Action::OrdersAdded(existing.clone()));
        let next = reduce(&state, &Action::OrdersAdded(incoming.clone()));

        let hashes: Vec<_> = next.orders.iter().map(|r| r.order_hash).collect();
        let unique: HashSet<_> = hashes.iter().copied().collect();
        prop_assert_eq!(hashes.len(), unique.len());

        let expected: HashSet<_> = existing.iter().chain(&incoming).map(|r| r.order_hash).collect();
        prop_assert_eq!(unique, expected);
    }

    /// The first record seen for a hash is the one kept.
    #[test]
    fn merge_keeps_earliest_record(existing in records(), incoming in records()) {
        let state = reduce(&ExchangeState::default(), &Action::OrdersAdded(existing.clone()));
        let next = reduce(&state, &Action::OrdersAdded(incoming.clone()));

        let mut first: HashMap<B256, &OrderRecord> = HashMap::new();
        for record in existing.iter().chain(&incoming) {
            first.entry(record.order_hash).or_insert(record);
        }
        for record in &next.orders {
            prop_assert_eq!(record, first[&record.order_hash]);
        }
    }

    /// Re-adding what is already there changes nothing.
    #[test]
    fn merge_is_idempotent(orders in records()) {
        let once = reduce(&ExchangeState::default(), &Action::OrdersAdded(orders.clone()));
        let twice = reduce(&once, &Action::OrdersAdded(orders));
        prop_assert_eq!(once, twice);
    }
}

// ── Filter Properties ───────────────────────────────────────

proptest! {
    /// Filtering keeps exactly the passing orders, in input order.
    #[test]
    fn filter_is_order_preserving_subsequence(
        salts in prop::collection::vec(0u64..32, 0..16),
        rejected in prop::collection::hash_set(0u64..32, 0..16),
    ) {
        let orders: Vec<_> = salts.iter().copied().map(order).collect();
        let client = client_rejecting(rejected.clone());

        let kept = tokio_test::block_on(client.filter_fillable_orders(&orders)).unwrap();

        let expected: Vec<_> = orders
            .iter()
            .filter(|o| !rejected.contains(&o.salt.to::<u64>()))
            .cloned()
            .collect();
        prop_assert_eq!(kept, expected);
    }
}

// ── Coercion Properties ─────────────────────────────────────

proptest! {
    /// Any representable amount converts to base units and back exactly.
    #[test]
    fn base_units_preserve_value(mantissa in 0i64..10_000_000_000, scale in 0u32..=18) {
        let amount = Decimal::new(mantissa, scale);
        let raw = to_base_units(amount, 18).unwrap();
        prop_assert_eq!(from_base_units(raw, 18).unwrap(), amount.normalize());
    }

    /// Normalization is case- and prefix-insensitive.
    #[test]
    fn address_normalization_is_canonical(bytes in prop::array::uniform20(any::<u8>())) {
        let hex = alloy::hex::encode(bytes);
        let canonical = normalize_address(&hex).unwrap();
        prop_assert_eq!(&normalize_address(&format!("0X{}", hex.to_uppercase())).unwrap(), &canonical);
        prop_assert_eq!(canonical.len(), 42);
        prop_assert!(canonical.starts_with("0x"));
    }
}
