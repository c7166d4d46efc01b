//! Fenced code block lines

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub fn char(self) -> char {
        match self {
            FenceKind::Backticks => '`',
            FenceKind::Tildes => '~',
        }
    }
}

/// An opening fence line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen {
    pub kind: FenceKind,
    /// Length of the fence run
    pub len: usize,
    /// Byte range of the language word within the line; empty (positioned
    /// right after the fence run) when there is no info string
    pub language: Range<usize>,
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";

    /// Parse an opening fence: up to three spaces, then three or more
    /// backticks or tildes, then an optional info string
    pub fn open(line: &str) -> Option<FenceOpen> {
        let indent = leading_spaces(line)?;
        let rest = &line[indent..];
        let kind = if rest.starts_with(Self::BACKTICKS) {
            FenceKind::Backticks
        } else if rest.starts_with(Self::TILDES) {
            FenceKind::Tildes
        } else {
            return None;
        };

        let len = rest.chars().take_while(|&c| c == kind.char()).count();
        let info_start = indent + len;
        let info = &line[info_start..];
        if kind == FenceKind::Backticks && info.contains('`') {
            return None;
        }

        let word_start = info_start + (info.len() - info.trim_start().len());
        let word_len = line[word_start..]
            .find(char::is_whitespace)
            .unwrap_or(line.len() - word_start);

        Some(FenceOpen {
            kind,
            len,
            language: word_start..word_start + word_len,
        })
    }

    /// Whether `line` closes a block opened by `open`
    pub fn closes(open: &FenceOpen, line: &str) -> bool {
        let Some(indent) = leading_spaces(line) else {
            return false;
        };
        let rest = &line[indent..];
        let run = rest.chars().take_while(|&c| c == open.kind.char()).count();
        run >= open.len && rest[run..].trim().is_empty()
    }
}

/// Indentation of a fence line, `None` past three spaces
fn leading_spaces(line: &str) -> Option<usize> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    (indent <= 3).then_some(indent)
}
