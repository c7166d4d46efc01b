//! Position mapping across a document transition

use std::fmt;
use std::ops::Range;

use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

/// Which side of an insertion at exactly the mapped position to land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// The ordered deltas of one transaction
///
/// Maps positions in the document before the transaction to positions in the
/// document after it.
#[derive(Clone, Default)]
pub struct Mapping {
    steps: Vec<Delta<RopeInfo>>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, delta: Delta<RopeInfo>) {
        self.steps.push(delta);
    }

    /// True when no step changes the text
    pub fn is_identity(&self) -> bool {
        self.steps.iter().all(|d| d.is_identity())
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.steps.iter().fold(pos, |pos, delta| {
            Transformer::new(delta).transform(pos, assoc == Assoc::After)
        })
    }

    /// Map a range so it grows to include text inserted at its edges
    pub fn map_range(&self, range: &Range<usize>) -> Range<usize> {
        let start = self.map(range.start, Assoc::Before);
        let end = self.map(range.end, Assoc::After);
        start..end.max(start)
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("steps", &self.steps.len())
            .finish()
    }
}
