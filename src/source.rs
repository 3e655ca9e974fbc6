//! Tick data source abstraction.
//!
//! Fetching tick data (HTTP, auth, pagination) lives outside this crate. A
//! source is whatever hands over one checkpoint plus its deltas; this module
//! defines that seam and two implementations:
//!
//! - [`VecSource`]: tick data already in memory
//! - [`JsonSource`]: a raw tick-history response body
//!
//! # Example
//!
//! ```
//! use tick_book_reconstructor::source::{JsonSource, TickDataSource};
//! use tick_book_reconstructor::{OrderBookReconstructor, ReconstructOptions};
//!
//! let body = r#"{
//!     "checkpoint": {
//!         "coin": "BTC",
//!         "timestamp": "2024-01-01T00:00:00Z",
//!         "bids": [{"px": "100", "sz": "1", "n": 2}],
//!         "asks": [{"px": "102", "sz": "1", "n": 1}]
//!     },
//!     "deltas": [
//!         {"timestamp": 1704067201000, "side": "bid", "price": "101", "size": "3", "sequence": 1}
//!     ]
//! }"#;
//!
//! let mut book = OrderBookReconstructor::new();
//! let snapshots = book
//!     .reconstruct_source(JsonSource::new(body), &ReconstructOptions::default())
//!     .unwrap();
//!
//! assert_eq!(snapshots.len(), 2);
//! assert_eq!(snapshots[1].bids[0].price, "101.0");
//! ```

use serde::Deserialize;

use crate::error::{ReconError, Result};
use crate::types::{OrderBook, OrderbookDelta, TickData};

/// Message used when a response carries no checkpoint and no explanation.
pub const TICK_DATA_UNAVAILABLE: &str = "Tick-level orderbook data requires Enterprise tier. \
     Upgrade your subscription or use a different granularity.";

// ============================================================================
// Source Metadata
// ============================================================================

/// Metadata about a tick data source, for logging and bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    /// Trading symbol (e.g., "BTC", "ETH")
    pub symbol: Option<String>,

    /// Data provider name (e.g., "memory", "json")
    pub provider: Option<String>,

    /// Estimated delta count (for progress tracking)
    pub estimated_deltas: Option<u64>,
}

impl SourceMetadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the estimated delta count.
    pub fn with_estimated_deltas(mut self, count: u64) -> Self {
        self.estimated_deltas = Some(count);
        self
    }
}

// ============================================================================
// Tick Data Source Trait
// ============================================================================

/// Trait for tick data sources.
///
/// `tick_data()` consumes `self`: a source is read once.
pub trait TickDataSource {
    /// Consume the source and return its checkpoint plus deltas.
    ///
    /// # Errors
    /// Source-specific; e.g. [`ReconError::TickDataUnavailable`] when the
    /// provider returned no checkpoint.
    fn tick_data(self) -> Result<TickData>;

    /// Get metadata about the source.
    fn metadata(&self) -> &SourceMetadata;
}

// ============================================================================
// Vector Source
// ============================================================================

/// In-memory tick data.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use tick_book_reconstructor::source::{TickDataSource, VecSource};
/// use tick_book_reconstructor::{OrderBook, OrderbookDelta, Side};
///
/// let checkpoint = OrderBook::new("BTC", Utc::now(), vec![], vec![]);
/// let deltas = vec![OrderbookDelta::new(0, Side::Bid, 100.0, 1.0, 1)];
///
/// let source = VecSource::new(checkpoint, deltas);
/// assert_eq!(source.metadata().symbol.as_deref(), Some("BTC"));
/// assert_eq!(source.tick_data().unwrap().deltas.len(), 1);
/// ```
pub struct VecSource {
    tick_data: TickData,
    metadata: SourceMetadata,
}

impl VecSource {
    /// Create a new in-memory source.
    pub fn new(checkpoint: OrderBook, deltas: Vec<OrderbookDelta>) -> Self {
        Self::from_tick_data(TickData::new(checkpoint, deltas))
    }

    /// Wrap existing tick data.
    pub fn from_tick_data(tick_data: TickData) -> Self {
        Self {
            metadata: SourceMetadata::new()
                .with_symbol(tick_data.checkpoint.symbol.clone())
                .with_provider("memory")
                .with_estimated_deltas(tick_data.deltas.len() as u64),
            tick_data,
        }
    }

    /// Set custom metadata.
    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl TickDataSource for VecSource {
    fn tick_data(self) -> Result<TickData> {
        Ok(self.tick_data)
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

// ============================================================================
// JSON Source
// ============================================================================

/// Tick data from a raw tick-history response body.
///
/// The body is decoded lazily in [`tick_data`](TickDataSource::tick_data).
/// A missing or `null` checkpoint means the account is not entitled to tick
/// granularity; the server's `error` or `message` field, if any, becomes the
/// [`ReconError::TickDataUnavailable`] message.
pub struct JsonSource {
    body: String,
    metadata: SourceMetadata,
}

#[derive(Deserialize)]
struct TickResponse {
    #[serde(default)]
    checkpoint: Option<OrderBook>,
    #[serde(default)]
    deltas: Option<Vec<OrderbookDelta>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl JsonSource {
    /// Create a source over a response body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            metadata: SourceMetadata::new().with_provider("json"),
        }
    }

    /// Set custom metadata.
    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl TickDataSource for JsonSource {
    fn tick_data(self) -> Result<TickData> {
        let response: TickResponse = serde_json::from_str(&self.body)?;

        let checkpoint = response.checkpoint.ok_or_else(|| {
            let msg = response
                .error
                .filter(|e| !e.is_empty())
                .or(response.message.filter(|m| !m.is_empty()))
                .unwrap_or_else(|| TICK_DATA_UNAVAILABLE.to_string());
            ReconError::TickDataUnavailable(msg)
        })?;
        let deltas = response.deltas.unwrap_or_default();

        log::debug!(
            "Decoded tick data for {}: {} deltas",
            checkpoint.symbol,
            deltas.len()
        );

        Ok(TickData::new(checkpoint, deltas))
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

// ============================================================================
// Tests
// ============================================================================
