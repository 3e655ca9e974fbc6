//! Core data types for checkpoints, deltas and reconstructed snapshots.
//!
//! Two representations of a price level exist:
//! - [`PriceLevel`]: the wire form, decimal strings as delivered by the data API
//! - `InternalLevel` (see [`crate::book`]): numeric form used during replay
//!
//! All wire types derive serde so a data-fetching collaborator can hand over
//! JSON directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReconError;

/// Book side of a delta or level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Side {
    /// Buy side
    Bid,
    /// Sell side
    Ask,
}

impl Side {
    /// Wire tag for this side.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }

    /// Check if this is a bid.
    #[inline(always)]
    pub fn is_bid(self) -> bool {
        matches!(self, Side::Bid)
    }

    /// Check if this is an ask.
    #[inline(always)]
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Ask)
    }
}

impl FromStr for Side {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bid" => Ok(Side::Bid),
            "ask" => Ok(Side::Ask),
            other => Err(ReconError::InvalidSide(other.to_string())),
        }
    }
}

impl TryFrom<String> for Side {
    type Error = ReconError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single price level in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price as a decimal string
    #[serde(rename = "px")]
    pub price: String,

    /// Total size at this price as a decimal string
    #[serde(rename = "sz")]
    pub size: String,

    /// Number of orders resting at this price
    #[serde(rename = "n")]
    pub orders: u32,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: impl Into<String>, size: impl Into<String>, orders: u32) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
            orders,
        }
    }
}

/// Full L2 book state at one instant, as returned by the data API.
///
/// Used as the replay checkpoint. The optional pricing fields are whatever
/// the server computed and are ignored by the reconstructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Trading pair symbol (e.g. "BTC")
    #[serde(rename = "coin", alias = "symbol")]
    pub symbol: String,

    /// Snapshot timestamp
    pub timestamp: DateTime<Utc>,

    /// Bid levels (best bid first)
    pub bids: Vec<PriceLevel>,

    /// Ask levels (best ask first)
    pub asks: Vec<PriceLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_bps: Option<String>,
}

/// Checkpoint a replay starts from.
pub type Checkpoint = OrderBook;

impl OrderBook {
    /// Create a book without server-side pricing fields.
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            bids,
            asks,
            mid_price: None,
            spread: None,
            spread_bps: None,
        }
    }
}

/// A single incremental change to one price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderbookDelta {
    /// Timestamp in milliseconds since epoch
    pub timestamp: i64,

    /// Side of the book this delta touches
    pub side: Side,

    /// Price level
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,

    /// New size at the level (0 = level removed)
    #[serde(deserialize_with = "number_or_string")]
    pub size: f64,

    /// Sequence number for ordering
    pub sequence: u64,
}

impl OrderbookDelta {
    /// Create a new delta.
    pub fn new(timestamp: i64, side: Side, price: f64, size: f64, sequence: u64) -> Self {
        Self {
            timestamp,
            side,
            price,
            size,
            sequence,
        }
    }

    /// Whether applying this delta removes its price level.
    #[inline]
    pub fn is_removal(&self) -> bool {
        self.size == 0.0
    }
}

/// Reconstructed book snapshot with sequence info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedOrderBook {
    #[serde(rename = "coin", alias = "symbol")]
    pub symbol: String,

    /// ISO-8601 UTC timestamp with a `Z` suffix
    pub timestamp: String,

    /// Bids, best (highest) first
    pub bids: Vec<PriceLevel>,

    /// Asks, best (lowest) first
    pub asks: Vec<PriceLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_bps: Option<String>,

    /// Sequence of the last applied delta (0 before any delta)
    pub sequence: u64,
}

impl ReconstructedOrderBook {
    /// Best bid level, if any.
    #[inline]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Best ask level, if any.
    #[inline]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

/// Raw tick data: checkpoint plus the deltas to replay on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    /// Initial book state
    pub checkpoint: OrderBook,

    /// Incremental changes to apply
    #[serde(default)]
    pub deltas: Vec<OrderbookDelta>,
}

impl TickData {
    pub fn new(checkpoint: OrderBook, deltas: Vec<OrderbookDelta>) -> Self {
        Self { checkpoint, deltas }
    }
}

/// A discontinuity in a delta sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceGap {
    /// Sequence that should have followed the previous delta
    pub expected: u64,
    /// Sequence actually found
    pub actual: u64,
}

impl SequenceGap {
    pub fn new(expected: u64, actual: u64) -> Self {
        Self { expected, actual }
    }

    /// Number of deltas missing in this gap (0 for duplicates or regressions).
    pub fn missing(&self) -> u64 {
        self.actual.saturating_sub(self.expected)
    }
}

impl From<(u64, u64)> for SequenceGap {
    fn from((expected, actual): (u64, u64)) -> Self {
        Self { expected, actual }
    }
}

impl From<SequenceGap> for (u64, u64) {
    fn from(gap: SequenceGap) -> Self {
        (gap.expected, gap.actual)
    }
}

// ============================================================================
// Timestamp rendering
// ============================================================================

/// Render a UTC instant as ISO-8601 with a `Z` suffix.
///
/// Whole seconds render as `2024-01-01T00:00:00Z`; anything finer carries
/// six fractional digits (`2024-01-01T00:00:00.123000Z`).
pub(crate) fn iso_utc(ts: &DateTime<Utc>) -> String {
    let format = if ts.timestamp_subsec_nanos() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(format, true)
}

/// Render a millisecond epoch timestamp, `None` if out of calendar range.
pub(crate) fn iso_utc_from_millis(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|ts| iso_utc(&ts))
}

/// Delta price or size given as a JSON number or a decimal string.
///
/// Non-finite values (`"NaN"`, `"inf"`) are rejected.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => value,
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "non-finite delta value: {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_side_parse() {
        assert_eq!("bid".parse::<Side>().unwrap(), Side::Bid);
        assert_eq!("ask".parse::<Side>().unwrap(), Side::Ask);
        assert!(matches!(
            "buy".parse::<Side>(),
            Err(ReconError::InvalidSide(tag)) if tag == "buy"
        ));
    }

    #[test]
    fn test_side_parse_is_case_sensitive() {
        for tag in ["BID", "Bid", "ASK", "Ask", " bid"] {
            assert!(matches!(
                tag.parse::<Side>(),
                Err(ReconError::InvalidSide(t)) if t == tag
            ));
        }
        assert!(serde_json::from_str::<Side>("\"Ask\"").is_err());
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Bid).unwrap(), "\"bid\"");
        let side: Side = serde_json::from_str("\"ask\"").unwrap();
        assert_eq!(side, Side::Ask);
        assert!(serde_json::from_str::<Side>("\"sell\"").is_err());
    }

    #[test]
    fn test_delta_from_json_numbers_and_strings() {
        let json = r#"[
            {"timestamp": 1700000000000, "side": "bid", "price": 100.5, "size": 2, "sequence": 7},
            {"timestamp": 1700000000001, "side": "ask", "price": "101.25", "size": "0", "sequence": 8}
        ]"#;
        let deltas: Vec<OrderbookDelta> = serde_json::from_str(json).unwrap();

        assert_eq!(deltas[0].side, Side::Bid);
        assert_eq!(deltas[0].price, 100.5);
        assert_eq!(deltas[0].size, 2.0);
        assert!(!deltas[0].is_removal());

        assert_eq!(deltas[1].price, 101.25);
        assert!(deltas[1].is_removal());
        assert_eq!(deltas[1].sequence, 8);
    }

    #[test]
    fn test_delta_rejects_non_finite_strings() {
        for value in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let price = format!(
                r#"{{"timestamp": 1, "side": "bid", "price": "{value}", "size": "1", "sequence": 1}}"#
            );
            assert!(serde_json::from_str::<OrderbookDelta>(&price).is_err(), "price {value}");

            let size = format!(
                r#"{{"timestamp": 1, "side": "ask", "price": "100", "size": "{value}", "sequence": 1}}"#
            );
            assert!(serde_json::from_str::<OrderbookDelta>(&size).is_err(), "size {value}");
        }
    }

    #[test]
    fn test_delta_rejects_unknown_side() {
        let json = r#"{"timestamp": 1, "side": "mid", "price": 1, "size": 1, "sequence": 1}"#;
        assert!(serde_json::from_str::<OrderbookDelta>(json).is_err());
    }

    #[test]
    fn test_order_book_wire_names() {
        let json = r#"{
            "coin": "BTC",
            "timestamp": "2024-01-01T00:00:00Z",
            "bids": [{"px": "100.0", "sz": "1.5", "n": 3}],
            "asks": [],
            "mid_price": "100.0"
        }"#;
        let book: OrderBook = serde_json::from_str(json).unwrap();

        assert_eq!(book.symbol, "BTC");
        assert_eq!(book.bids[0], PriceLevel::new("100.0", "1.5", 3));
        assert!(book.asks.is_empty());
        assert_eq!(book.mid_price.as_deref(), Some("100.0"));
        assert!(book.spread.is_none());
    }

    #[test]
    fn test_sequence_gap_conversions() {
        let gap = SequenceGap::from((3, 7));
        assert_eq!(gap.missing(), 4);
        assert_eq!(<(u64, u64)>::from(gap), (3, 7));

        // duplicate sequence: expected past actual
        assert_eq!(SequenceGap::new(5, 4).missing(), 0);
    }

    #[test]
    fn test_iso_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(iso_utc(&ts), "2024-01-01T00:00:00Z");

        assert_eq!(
            iso_utc_from_millis(1_704_067_200_123).unwrap(),
            "2024-01-01T00:00:00.123000Z"
        );
        assert_eq!(
            iso_utc_from_millis(1_704_067_200_000).unwrap(),
            "2024-01-01T00:00:00Z"
        );
        assert!(iso_utc_from_millis(i64::MAX).is_none());
    }
}
