//! Replay a tick-history response body read from a file (or stdin).
//!
//! Run with: cargo run --example replay_json -- response.json [depth]

use std::io::Read;

use tick_book_reconstructor::{
    JsonSource, OrderBookReconstructor, ReconError, TickDataSource,
};

fn main() -> tick_book_reconstructor::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let body = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| ReconError::generic(format!("reading {path}: {e}")))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .map_err(|e| ReconError::generic(format!("reading stdin: {e}")))?;
            body
        }
    };
    let depth = args.next().and_then(|d| d.parse().ok());

    let tick_data = JsonSource::new(body).tick_data()?;
    log::info!(
        "{}: checkpoint with {} bids / {} asks, {} deltas",
        tick_data.checkpoint.symbol,
        tick_data.checkpoint.bids.len(),
        tick_data.checkpoint.asks.len(),
        tick_data.deltas.len()
    );

    let gaps = OrderBookReconstructor::detect_gaps(&tick_data.deltas);
    if !gaps.is_empty() {
        let missing: u64 = gaps.iter().map(|g| g.missing()).sum();
        log::warn!("{} sequence gaps, {} deltas missing", gaps.len(), missing);
    }

    let mut book = OrderBookReconstructor::new();
    for snapshot in book.iterate(&tick_data.checkpoint, &tick_data.deltas, depth)? {
        println!(
            "{} seq={} bid={} ask={} mid={}",
            snapshot.timestamp,
            snapshot.sequence,
            snapshot.best_bid().map_or("-", |l| l.price.as_str()),
            snapshot.best_ask().map_or("-", |l| l.price.as_str()),
            snapshot.mid_price.as_deref().unwrap_or("-"),
        );
    }

    log::info!("Replay stats: {:?}", book.stats());
    Ok(())
}
