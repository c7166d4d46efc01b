use std::ops::Range;

use thiserror::Error;

use crate::code_block_view::ViewId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("range {range:?} is outside the document (length {len}) or splits a character")]
    InvalidRange { range: Range<usize>, len: usize },

    #[error("no code block starts at {pos}")]
    NoCodeBlock { pos: usize },

    #[error("`{language}` cannot be used as a code block language")]
    InvalidLanguage { language: String },

    #[error("no mounted code block view {0:?}")]
    UnknownView(ViewId),
}
