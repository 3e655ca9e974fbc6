//! Basic usage example: replay a handful of deltas on a checkpoint.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_usage

use chrono::{TimeZone, Utc};
use tick_book_reconstructor::{
    OrderBook, OrderBookReconstructor, OrderbookDelta, PriceLevel, ReconstructedOrderBook, Side,
};

fn print_book(label: &str, book: &ReconstructedOrderBook) {
    println!("{label} (seq {}, {})", book.sequence, book.timestamp);
    for level in book.asks.iter().rev() {
        println!("    ask {:>10} x {:<6} ({} orders)", level.price, level.size, level.orders);
    }
    for level in &book.bids {
        println!("    bid {:>10} x {:<6} ({} orders)", level.price, level.size, level.orders);
    }
    println!(
        "    mid={} spread={} bps={}",
        book.mid_price.as_deref().unwrap_or("-"),
        book.spread.as_deref().unwrap_or("-"),
        book.spread_bps.as_deref().unwrap_or("-"),
    );
    println!();
}

fn main() -> tick_book_reconstructor::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let checkpoint = OrderBook::new(
        "BTC",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        vec![
            PriceLevel::new("42000.5", "1.2", 4),
            PriceLevel::new("42000", "0.5", 2),
        ],
        vec![
            PriceLevel::new("42001", "0.8", 3),
            PriceLevel::new("42002", "2", 5),
        ],
    );

    let deltas = vec![
        OrderbookDelta::new(1_704_067_200_250, Side::Bid, 42000.75, 0.3, 101),
        OrderbookDelta::new(1_704_067_200_500, Side::Ask, 42001.0, 0.0, 102),
        OrderbookDelta::new(1_704_067_201_000, Side::Ask, 42000.9, 1.1, 104),
    ];

    let gaps = OrderBookReconstructor::detect_gaps(&deltas);
    for gap in &gaps {
        log::warn!("gap: expected {}, got {}", gap.expected, gap.actual);
    }

    let mut book = OrderBookReconstructor::new();
    for (i, snapshot) in book.iterate(&checkpoint, &deltas, Some(5))?.enumerate() {
        print_book(&format!("State {i}"), &snapshot);
    }

    println!("Stats: {:?}", book.stats());
    Ok(())
}
