//! Single-symbol order book reconstructor.
//!
//! Implementation notes:
//! - BTreeMap per side keyed by price, so snapshots come out sorted
//! - Checkpoint strings are parsed once; replay is pure `f64`
//! - Every delta that sets a size reports exactly one order at that level,
//!   since deltas carry no order counts

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use super::gaps;
use super::level::{format_decimal, InternalLevel};
use super::replay::{sorted_by_sequence, Replay};
use crate::error::Result;
use crate::source::TickDataSource;
use crate::types::{
    iso_utc, iso_utc_from_millis, OrderBook, OrderbookDelta, PriceLevel, ReconstructedOrderBook,
    SequenceGap, Side, TickData,
};

type SideMap = BTreeMap<OrderedFloat<f64>, InternalLevel>;

/// Options for bulk reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Maximum price levels per side in each snapshot (`None` or `Some(0)` = all)
    pub depth: Option<usize>,

    /// Emit a snapshot after every delta; otherwise only the final state
    pub emit_all: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            depth: None,
            emit_all: true,
        }
    }
}

impl ReconstructOptions {
    /// Create options with defaults (all levels, emit every state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit snapshot depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Enable/disable intermediate snapshots.
    pub fn with_emit_all(mut self, emit_all: bool) -> Self {
        self.emit_all = emit_all;
        self
    }
}

/// Counters describing what replay did to the book since the last checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Deltas applied
    pub deltas_applied: u64,

    /// Deltas that created a new price level
    pub levels_inserted: u64,

    /// Deltas that overwrote an existing price level
    pub levels_updated: u64,

    /// Deltas that removed an existing price level
    pub levels_removed: u64,

    /// Removal deltas for prices that were not in the book
    pub missing_removals: u64,

    /// Current number of bid levels
    pub bid_levels: usize,

    /// Current number of ask levels
    pub ask_levels: usize,
}

/// Order book reconstructor for one symbol.
///
/// Holds the live book state and rebuilds it from a checkpoint plus deltas.
/// Reusable: every [`initialize`](Self::initialize) replaces the whole state.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tick_book_reconstructor::{OrderBook, OrderBookReconstructor, OrderbookDelta, PriceLevel, Side};
///
/// let checkpoint = OrderBook::new(
///     "BTC",
///     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     vec![PriceLevel::new("100", "1", 3)],
///     vec![PriceLevel::new("102", "1", 2)],
/// );
///
/// let mut book = OrderBookReconstructor::new();
/// book.initialize(&checkpoint).unwrap();
/// book.apply_delta(&OrderbookDelta::new(1_704_067_201_000, Side::Bid, 101.0, 0.5, 1));
///
/// let snapshot = book.get_snapshot(None);
/// assert_eq!(snapshot.bids[0].price, "101.0");
/// assert_eq!(snapshot.sequence, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderBookReconstructor {
    /// Bid levels: price -> level (iterate in reverse for best first)
    bids: SideMap,

    /// Ask levels: price -> level
    asks: SideMap,

    symbol: String,

    /// ISO-8601 timestamp of the checkpoint or last applied delta
    last_timestamp: String,

    /// Sequence of the last applied delta (0 after initialize)
    last_sequence: u64,

    stats: ReplayStats,
}

impl OrderBookReconstructor {
    /// Create an empty reconstructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize or reset the book from a checkpoint.
    ///
    /// # Errors
    /// Returns `InvalidPrice` / `InvalidSize` if a checkpoint level does not
    /// hold a finite number. The current state is left untouched in that case.
    pub fn initialize(&mut self, checkpoint: &OrderBook) -> Result<()> {
        let bids = load_side(&checkpoint.bids)?;
        let asks = load_side(&checkpoint.asks)?;

        self.bids = bids;
        self.asks = asks;
        self.symbol.clone_from(&checkpoint.symbol);
        self.last_timestamp = iso_utc(&checkpoint.timestamp);
        self.last_sequence = 0;
        self.stats = ReplayStats {
            bid_levels: self.bids.len(),
            ask_levels: self.asks.len(),
            ..ReplayStats::default()
        };

        log::debug!(
            "Initialized {} book at {}: {} bid levels, {} ask levels",
            self.symbol,
            self.last_timestamp,
            self.bids.len(),
            self.asks.len()
        );

        Ok(())
    }

    /// Apply a single delta to the current state.
    ///
    /// Size 0 removes the level (absent levels are ignored); any other size
    /// replaces it with an order count of 1. The sequence is recorded as-is,
    /// contiguity is not checked here (see [`detect_gaps`](Self::detect_gaps)).
    pub fn apply_delta(&mut self, delta: &OrderbookDelta) {
        let book = match delta.side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        let key = OrderedFloat(delta.price);

        if delta.is_removal() {
            if book.remove(&key).is_some() {
                self.stats.levels_removed += 1;
            } else {
                self.stats.missing_removals += 1;
                log::trace!(
                    "Removal of absent {} level {} (seq {})",
                    delta.side,
                    delta.price,
                    delta.sequence
                );
            }
        } else {
            let level = InternalLevel::new(delta.price, delta.size, 1);
            if book.insert(key, level).is_some() {
                self.stats.levels_updated += 1;
            } else {
                self.stats.levels_inserted += 1;
            }
        }

        match iso_utc_from_millis(delta.timestamp) {
            Some(ts) => self.last_timestamp = ts,
            None => log::warn!(
                "Delta timestamp {}ms out of range (seq {}), keeping {}",
                delta.timestamp,
                delta.sequence,
                self.last_timestamp
            ),
        }
        self.last_sequence = delta.sequence;

        self.stats.deltas_applied += 1;
        self.stats.bid_levels = self.bids.len();
        self.stats.ask_levels = self.asks.len();
    }

    /// Get the current book state as a snapshot.
    ///
    /// # Arguments
    /// * `depth` - Maximum levels per side; `None` or `Some(0)` for all levels
    pub fn get_snapshot(&self, depth: Option<usize>) -> ReconstructedOrderBook {
        let limit = match depth {
            None | Some(0) => usize::MAX,
            Some(k) => k,
        };

        let bids: Vec<PriceLevel> = self
            .bids
            .values()
            .rev()
            .take(limit)
            .map(InternalLevel::to_wire)
            .collect();
        let asks: Vec<PriceLevel> = self
            .asks
            .values()
            .take(limit)
            .map(InternalLevel::to_wire)
            .collect();

        let (mid_price, spread, spread_bps) = match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                let mid = (bid + ask) / 2.0;
                let spread = ask - bid;
                let spread_bps =
                    (mid != 0.0).then(|| format!("{:.2}", spread / mid * 10_000.0));
                (
                    Some(format_decimal(mid)),
                    Some(format_decimal(spread)),
                    spread_bps,
                )
            }
            _ => (None, None, None),
        };

        ReconstructedOrderBook {
            symbol: self.symbol.clone(),
            timestamp: self.last_timestamp.clone(),
            bids,
            asks,
            mid_price,
            spread,
            spread_bps,
            sequence: self.last_sequence,
        }
    }

    /// Reconstruct all book states from a checkpoint plus deltas.
    ///
    /// Deltas are replayed in sequence order regardless of input order. With
    /// `emit_all` the result holds the initial state plus one snapshot per
    /// delta; otherwise only the final state. Prefer [`iterate`](Self::iterate)
    /// for large inputs.
    pub fn reconstruct_all(
        &mut self,
        checkpoint: &OrderBook,
        deltas: &[OrderbookDelta],
        options: &ReconstructOptions,
    ) -> Result<Vec<ReconstructedOrderBook>> {
        if options.emit_all {
            Ok(self.iterate(checkpoint, deltas, options.depth)?.collect())
        } else {
            Ok(vec![self.reconstruct_final(checkpoint, deltas, options.depth)?])
        }
    }

    /// Lazily reconstruct book states, one snapshot per `next()`.
    ///
    /// Yields the initial state, then the state after each delta in sequence
    /// order. Snapshots are only built when requested, so dropping the
    /// iterator early skips the remaining work.
    pub fn iterate<'book, 'deltas>(
        &'book mut self,
        checkpoint: &OrderBook,
        deltas: &'deltas [OrderbookDelta],
        depth: Option<usize>,
    ) -> Result<Replay<'book, 'deltas>> {
        let sorted = sorted_by_sequence(deltas);
        self.initialize(checkpoint)?;
        Ok(Replay::new(self, sorted, depth))
    }

    /// Replay every delta and return only the final state.
    pub fn reconstruct_final(
        &mut self,
        checkpoint: &OrderBook,
        deltas: &[OrderbookDelta],
        depth: Option<usize>,
    ) -> Result<ReconstructedOrderBook> {
        let sorted = sorted_by_sequence(deltas);
        self.initialize(checkpoint)?;
        for delta in sorted {
            self.apply_delta(delta);
        }
        Ok(self.get_snapshot(depth))
    }

    /// Fetch tick data from a source and reconstruct it.
    pub fn reconstruct_source<S: TickDataSource>(
        &mut self,
        source: S,
        options: &ReconstructOptions,
    ) -> Result<Vec<ReconstructedOrderBook>> {
        let tick_data = source.tick_data()?;
        self.reconstruct_all(&tick_data.checkpoint, &tick_data.deltas, options)
    }

    /// Check for sequence gaps in deltas.
    ///
    /// Independent of any reconstructor state; see [`gaps::detect_gaps`].
    pub fn detect_gaps(deltas: &[OrderbookDelta]) -> Vec<SequenceGap> {
        gaps::detect_gaps(deltas)
    }

    /// Symbol of the current checkpoint.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Timestamp of the checkpoint or last applied delta.
    pub fn last_timestamp(&self) -> &str {
        &self.last_timestamp
    }

    /// Sequence of the last applied delta (0 if none).
    #[inline]
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Highest bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.keys().next_back().map(|price| price.0)
    }

    /// Lowest ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.keys().next().map(|price| price.0)
    }

    /// Number of bid levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Replay counters since the last checkpoint.
    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }
}

fn load_side(levels: &[PriceLevel]) -> Result<SideMap> {
    let mut side = SideMap::new();
    for level in levels {
        let level = InternalLevel::from_wire(level)?;
        side.insert(OrderedFloat(level.price), level);
    }
    Ok(side)
}

/// One-shot reconstruction of every state in `tick_data`.
pub fn reconstruct_orderbook(
    tick_data: &TickData,
    options: &ReconstructOptions,
) -> Result<Vec<ReconstructedOrderBook>> {
    OrderBookReconstructor::new().reconstruct_all(&tick_data.checkpoint, &tick_data.deltas, options)
}

/// One-shot reconstruction of the final state in `tick_data`.
pub fn reconstruct_final(
    tick_data: &TickData,
    depth: Option<usize>,
) -> Result<ReconstructedOrderBook> {
    OrderBookReconstructor::new().reconstruct_final(&tick_data.checkpoint, &tick_data.deltas, depth)
}
