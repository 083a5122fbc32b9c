//! Anchor spans: token offsets a node is grounded to.
//!
//! Anchors travel as half-open `{from, to}` spans and are kept inside the
//! parser as expanded offset sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Half-open token span `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn new(from: usize, to: usize) -> Self {
        Span { from, to }
    }

    pub fn offsets(&self) -> std::ops::Range<usize> {
        self.from..self.to
    }
}

/// Expands spans into the set of covered offsets.
pub fn expand_anchors(spans: &[Span]) -> BTreeSet<usize> {
    spans.iter().flat_map(Span::offsets).collect()
}

/// Collapses an offset set into maximal contiguous spans.
pub fn compress_anchors(offsets: &BTreeSet<usize>) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for &offset in offsets {
        match spans.last_mut() {
            Some(last) if last.to == offset => last.to = offset + 1,
            _ => spans.push(Span::new(offset, offset + 1)),
        }
    }
    spans
}
