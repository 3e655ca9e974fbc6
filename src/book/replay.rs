//! Lazy, single-pass replay over a sorted delta log.

use std::iter::FusedIterator;

use super::reconstructor::OrderBookReconstructor;
use crate::types::{OrderbookDelta, ReconstructedOrderBook};

/// Sort deltas by sequence, keeping input order among equal sequences.
pub(crate) fn sorted_by_sequence(deltas: &[OrderbookDelta]) -> Vec<&OrderbookDelta> {
    let mut sorted: Vec<&OrderbookDelta> = deltas.iter().collect();
    sorted.sort_by_key(|delta| delta.sequence);
    sorted
}

/// Iterator over reconstructed states, created by
/// [`OrderBookReconstructor::iterate`].
///
/// Yields the checkpoint state first, then one snapshot per delta. Each
/// snapshot is built on demand and nothing is retained between calls. The
/// iterator holds the reconstructor mutably and cannot be rewound; call
/// `iterate` again to replay.
#[derive(Debug)]
pub struct Replay<'book, 'deltas> {
    book: &'book mut OrderBookReconstructor,
    deltas: std::vec::IntoIter<&'deltas OrderbookDelta>,
    depth: Option<usize>,
    initial_pending: bool,
}

impl<'book, 'deltas> Replay<'book, 'deltas> {
    pub(crate) fn new(
        book: &'book mut OrderBookReconstructor,
        sorted: Vec<&'deltas OrderbookDelta>,
        depth: Option<usize>,
    ) -> Self {
        Self {
            book,
            deltas: sorted.into_iter(),
            depth,
            initial_pending: true,
        }
    }

    /// The reconstructor state as of the last yielded snapshot.
    pub fn book(&self) -> &OrderBookReconstructor {
        self.book
    }
}

impl Iterator for Replay<'_, '_> {
    type Item = ReconstructedOrderBook;

    fn next(&mut self) -> Option<Self::Item> {
        if self.initial_pending {
            self.initial_pending = false;
        } else {
            let delta = self.deltas.next()?;
            self.book.apply_delta(delta);
        }
        Some(self.book.get_snapshot(self.depth))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.deltas.len() + usize::from(self.initial_pending);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Replay<'_, '_> {}

impl FusedIterator for Replay<'_, '_> {}
