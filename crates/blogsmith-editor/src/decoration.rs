//! Inline style overlay for code block tokens

use crate::mapping::{Assoc, Mapping};

/// An inline style applied to `from..to` of the document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub style: String,
}

impl Decoration {
    pub fn new(from: usize, to: usize, style: impl Into<String>) -> Self {
        Self {
            from,
            to,
            style: style.into(),
        }
    }
}

/// Decorations in document order
///
/// Sets are values: mapping through an edit produces a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn new(mut decorations: Vec<Decoration>) -> Self {
        decorations.retain(|d| d.from < d.to);
        decorations.sort();
        Self { decorations }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    /// Decorations overlapping `from..to`
    pub fn find(&self, from: usize, to: usize) -> impl Iterator<Item = &Decoration> {
        self.decorations
            .iter()
            .filter(move |d| d.from < to && d.to > from)
    }

    /// Reposition every decoration through an edit
    ///
    /// Text inserted at a decoration's edge is not absorbed into it, and
    /// decorations whose text was deleted disappear.
    pub fn map(&self, mapping: &Mapping) -> Self {
        if mapping.is_identity() {
            return self.clone();
        }

        let decorations = self
            .decorations
            .iter()
            .filter_map(|d| {
                let from = mapping.map(d.from, Assoc::After);
                let to = mapping.map(d.to, Assoc::Before);
                (from < to).then(|| Decoration::new(from, to, d.style.clone()))
            })
            .collect();

        Self { decorations }
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.decorations.iter()
    }
}
