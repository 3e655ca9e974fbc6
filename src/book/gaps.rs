//! Sequence gap detection over a delta collection.

use crate::types::{OrderbookDelta, SequenceGap};

/// Check for sequence gaps in deltas.
///
/// Deltas are considered in sequence order. Every consecutive pair whose
/// sequence is not exactly one past its predecessor yields
/// `(predecessor + 1, actual)`; duplicates therefore show up as gaps too.
/// A predecessor of `u64::MAX` has no successor, so whatever follows it is
/// reported as a gap with `expected == u64::MAX`.
/// Nothing is known about what preceded the first delta, so no gap is ever
/// reported before it.
///
/// # Example
/// ```
/// use tick_book_reconstructor::{detect_gaps, OrderbookDelta, SequenceGap, Side};
///
/// let deltas: Vec<_> = [1, 2, 4, 5, 7]
///     .into_iter()
///     .map(|seq| OrderbookDelta::new(0, Side::Bid, 1.0, 1.0, seq))
///     .collect();
///
/// assert_eq!(
///     detect_gaps(&deltas),
///     vec![SequenceGap::new(3, 4), SequenceGap::new(6, 7)]
/// );
/// ```
pub fn detect_gaps(deltas: &[OrderbookDelta]) -> Vec<SequenceGap> {
    if deltas.len() < 2 {
        return Vec::new();
    }

    let mut sequences: Vec<u64> = deltas.iter().map(|delta| delta.sequence).collect();
    sequences.sort_unstable();

    let gaps: Vec<SequenceGap> = sequences
        .windows(2)
        .filter_map(|pair| match pair[0].checked_add(1) {
            Some(expected) if expected == pair[1] => None,
            Some(expected) => Some(SequenceGap::new(expected, pair[1])),
            None => Some(SequenceGap::new(u64::MAX, pair[1])),
        })
        .collect();

    for gap in &gaps {
        log::debug!(
            "Sequence gap: expected {}, got {} ({} missing)",
            gap.expected,
            gap.actual,
            gap.missing()
        );
    }

    gaps
}
