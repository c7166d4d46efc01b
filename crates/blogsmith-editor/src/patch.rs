use std::ops::Range;

use crate::mapping::Mapping;

/// Result of applying a transaction
#[derive(Debug, Clone)]
pub struct Patch {
    /// Inserted (or, for deletions, collapsed) ranges in the new document
    pub changed: Vec<Range<usize>>,
    pub new_selection: Range<usize>,
    pub version: u64,
    /// Old positions to new positions
    pub mapping: Mapping,
    /// Whether the text changed at all
    pub doc_changed: bool,
    /// Whether an edit reached into a code block, or code blocks appeared,
    /// vanished or changed language
    pub touched_code_block: bool,
}
