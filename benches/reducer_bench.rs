//! Reducer Benchmarks - Order Merge Hot Path
//!
//! Every relayer sync dispatches its full order listing through the
//! reducer, so the merge cost grows with the book size.
//!
//! Run with: cargo bench --bench reducer_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use alloy::primitives::{Address, B256, Bytes, U256};

use dex_exchange_client::domain::{reduce, Action, ExchangeState, OrderRecord, SignedOrder};

fn record(index: u64) -> OrderRecord {
    let order = SignedOrder {
        maker_address: Address::repeat_byte(0x11),
        taker_address: Address::ZERO,
        fee_recipient_address: Address::ZERO,
        sender_address: Address::ZERO,
        maker_asset_amount: U256::from(1_000u64),
        taker_asset_amount: U256::from(2_000u64),
        maker_fee: U256::ZERO,
        taker_fee: U256::ZERO,
        expiration_time_seconds: U256::from(1_900_000_000u64),
        salt: U256::from(index),
        maker_asset_data: Bytes::new(),
        taker_asset_data: Bytes::new(),
        exchange_address: Address::repeat_byte(0xee),
        signature: Bytes::new(),
    };
    OrderRecord::new(B256::from(U256::from(index)), order)
}

/// Benchmark merging a sync round that is half new, half already known.
fn bench_orders_added(c: &mut Criterion) {
    let mut group = c.benchmark_group("orders_added");

    for size in [100u64, 1_000, 10_000] {
        let existing: Vec<_> = (0..size).map(record).collect();
        let state = reduce(&ExchangeState::default(), &Action::OrdersAdded(existing));
        let incoming = Action::OrdersAdded((size / 2..size + size / 2).map(record).collect());

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let _next = reduce(black_box(&state), black_box(&incoming));
            });
        });
    }

    group.finish();
}

/// Benchmark replacing the product list (clone-dominated).
fn bench_untouched_orders(c: &mut Criterion) {
    let existing: Vec<_> = (0..1_000).map(record).collect();
    let state = reduce(&ExchangeState::default(), &Action::OrdersAdded(existing));
    let action = Action::ProductsSet(Vec::new());

    c.bench_function("products_set_1000_orders", |b| {
        b.iter(|| {
            let _next = reduce(black_box(&state), black_box(&action));
        });
    });
}

criterion_group!(benches, bench_orders_added, bench_untouched_orders);
criterion_main!(benches);
