//! Property-based replay tests (proptest).
//!
//! Random delta logs over a narrow price grid so levels are hit repeatedly:
//! inserts, overwrites and removals all get exercised.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use tick_book_reconstructor::{
    OrderBook, OrderBookReconstructor, OrderbookDelta, PriceLevel, ReconstructOptions, Side,
};

fn checkpoint() -> OrderBook {
    OrderBook::new(
        "BTC",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        vec![
            PriceLevel::new("99.5", "2", 3),
            PriceLevel::new("99", "1", 1),
        ],
        vec![
            PriceLevel::new("100.5", "1.5", 2),
            PriceLevel::new("101", "4", 6),
        ],
    )
}

fn arb_delta() -> impl Strategy<Value = (bool, u8, u8)> {
    // (is_bid, price tick, size: 0 removes)
    (any::<bool>(), 0u8..20, 0u8..4)
}

/// Deltas with unique sequences 1..=n in the given order.
fn build_log(raw: &[(bool, u8, u8)]) -> Vec<OrderbookDelta> {
    raw.iter()
        .enumerate()
        .map(|(i, &(is_bid, tick, size))| {
            let side = if is_bid { Side::Bid } else { Side::Ask };
            let price = 95.0 + f64::from(tick) * 0.5;
            OrderbookDelta::new(
                1_704_067_200_000 + i as i64,
                side,
                price,
                f64::from(size),
                i as u64 + 1,
            )
        })
        .collect()
}

fn prices(levels: &[PriceLevel]) -> Vec<f64> {
    levels.iter().map(|l| l.price.parse().unwrap()).collect()
}

proptest! {
    #[test]
    fn prop_sides_strictly_sorted(raw in prop::collection::vec(arb_delta(), 0..200)) {
        let mut book = OrderBookReconstructor::new();
        book.initialize(&checkpoint()).unwrap();

        for delta in build_log(&raw) {
            book.apply_delta(&delta);
            let snapshot = book.get_snapshot(None);
            let bids = prices(&snapshot.bids);
            let asks = prices(&snapshot.asks);
            prop_assert!(bids.windows(2).all(|w| w[0] > w[1]));
            prop_assert!(asks.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn prop_no_zero_size_levels(raw in prop::collection::vec(arb_delta(), 0..200)) {
        let mut book = OrderBookReconstructor::new();
        let last = book.reconstruct_final(&checkpoint(), &build_log(&raw), None).unwrap();

        for level in last.bids.iter().chain(&last.asks) {
            prop_assert_ne!(level.size.parse::<f64>().unwrap(), 0.0);
        }
    }

    #[test]
    fn prop_removed_price_absent(
        raw in prop::collection::vec(arb_delta(), 0..100),
        is_bid in any::<bool>(),
        tick in 0u8..20,
    ) {
        let mut book = OrderBookReconstructor::new();
        book.initialize(&checkpoint()).unwrap();
        for delta in build_log(&raw) {
            book.apply_delta(&delta);
        }

        let side = if is_bid { Side::Bid } else { Side::Ask };
        let price = 95.0 + f64::from(tick) * 0.5;
        book.apply_delta(&OrderbookDelta::new(0, side, price, 0.0, u64::MAX));

        let snapshot = book.get_snapshot(None);
        let levels = if is_bid { &snapshot.bids } else { &snapshot.asks };
        prop_assert!(!prices(levels).contains(&price));
    }

    #[test]
    fn prop_touched_levels_have_one_order(raw in prop::collection::vec(arb_delta(), 1..100)) {
        let log = build_log(&raw);
        let mut book = OrderBookReconstructor::new();
        book.initialize(&checkpoint()).unwrap();

        for delta in &log {
            book.apply_delta(delta);
            if delta.is_removal() {
                continue;
            }
            let snapshot = book.get_snapshot(None);
            let levels = if delta.side.is_bid() { &snapshot.bids } else { &snapshot.asks };
            let level = levels
                .iter()
                .find(|l| l.price.parse::<f64>().unwrap() == delta.price)
                .unwrap();
            prop_assert_eq!(level.orders, 1);
        }
    }

    #[test]
    fn prop_depth_is_truncation(
        raw in prop::collection::vec(arb_delta(), 0..150),
        depth in 1usize..12,
    ) {
        let mut book = OrderBookReconstructor::new();
        book.initialize(&checkpoint()).unwrap();
        for delta in build_log(&raw) {
            book.apply_delta(&delta);
        }

        let full = book.get_snapshot(None);
        let limited = book.get_snapshot(Some(depth));
        prop_assert_eq!(&limited.bids[..], &full.bids[..depth.min(full.bids.len())]);
        prop_assert_eq!(&limited.asks[..], &full.asks[..depth.min(full.asks.len())]);
    }

    #[test]
    fn prop_bulk_final_lazy_equivalent(raw in prop::collection::vec(arb_delta(), 0..120)) {
        let cp = checkpoint();
        let log = build_log(&raw);
        let mut book = OrderBookReconstructor::new();

        let all = book.reconstruct_all(&cp, &log, &ReconstructOptions::default()).unwrap();
        let last = book.reconstruct_final(&cp, &log, None).unwrap();
        let lazy_last = book.iterate(&cp, &log, None).unwrap().last().unwrap();

        prop_assert_eq!(all.len(), log.len() + 1);
        prop_assert_eq!(all.last().unwrap(), &last);
        prop_assert_eq!(&lazy_last, &last);
    }

    #[test]
    fn prop_input_order_irrelevant(
        raw in prop::collection::vec(arb_delta(), 0..120)
            .prop_flat_map(|raw| {
                let len = raw.len();
                (Just(raw), Just((0..len).collect::<Vec<_>>()).prop_shuffle())
            })
    ) {
        let (raw, permutation) = raw;
        let log = build_log(&raw);
        let scrambled: Vec<OrderbookDelta> = permutation.iter().map(|&i| log[i]).collect();

        let mut book = OrderBookReconstructor::new();
        let options = ReconstructOptions::default();
        let from_sorted = book.reconstruct_all(&checkpoint(), &log, &options).unwrap();
        let from_scrambled = book.reconstruct_all(&checkpoint(), &scrambled, &options).unwrap();

        prop_assert_eq!(from_sorted, from_scrambled);
    }

    #[test]
    fn prop_snapshot_idempotent(raw in prop::collection::vec(arb_delta(), 0..100), depth in 0usize..6) {
        let mut book = OrderBookReconstructor::new();
        book.initialize(&checkpoint()).unwrap();
        for delta in build_log(&raw) {
            book.apply_delta(&delta);
        }

        let depth = (depth > 0).then_some(depth);
        prop_assert_eq!(book.get_snapshot(depth), book.get_snapshot(depth));
    }
}
