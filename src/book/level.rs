//! Numeric price level held by the state store.
//!
//! Checkpoint levels arrive as decimal strings and are converted once on
//! ingestion; snapshots convert back. Replay never touches strings.
//!
//! # Rendering
//!
//! Values render with the shortest representation that round-trips the
//! `f64`, never in exponent notation, and always with a fractional part:
//!
//! | value | rendered |
//! |-------|----------|
//! | `100.0` | `"100.0"` |
//! | `0.5` | `"0.5"` |
//! | `0.1 + 0.2` | `"0.30000000000000004"` |

use crate::error::{ReconError, Result};
use crate::types::PriceLevel;

/// Price level stored internally with numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalLevel {
    pub price: f64,
    pub size: f64,
    pub orders: u32,
}

impl InternalLevel {
    #[inline]
    pub fn new(price: f64, size: f64, orders: u32) -> Self {
        Self {
            price,
            size,
            orders,
        }
    }

    /// Parse a wire level, rejecting prices or sizes that are not finite numbers.
    pub fn from_wire(level: &PriceLevel) -> Result<Self> {
        let price = parse_decimal(&level.price)
            .ok_or_else(|| ReconError::InvalidPrice(level.price.clone()))?;
        let size = parse_decimal(&level.size)
            .ok_or_else(|| ReconError::InvalidSize(level.size.clone()))?;

        Ok(Self::new(price, size, level.orders))
    }

    /// Convert back to wire form.
    pub fn to_wire(&self) -> PriceLevel {
        PriceLevel::new(
            format_decimal(self.price),
            format_decimal(self.size),
            self.orders,
        )
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render an `f64` as a plain decimal string (see module docs).
pub fn format_decimal(value: f64) -> String {
    let mut rendered = value.to_string();
    if value.is_finite() && !rendered.contains('.') {
        rendered.push_str(".0");
    }
    rendered
}
