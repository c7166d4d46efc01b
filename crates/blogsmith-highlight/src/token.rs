//! Tokenized output
//!
//! The result of tokenizing a code block is an ordered list of lines, each
//! an ordered list of [`Token`]s. Adjacent text that resolves to the same
//! style under both themes is one token.

use crate::style::DualStyle;

/// Language name reported for text no grammar has seen
pub const PLAINTEXT: &str = "plaintext";

/// A span of source text with its dual-theme style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub content: String,
    pub style: DualStyle,
}

/// Tokenization of one code block: lines of tokens
///
/// Empty lines have no tokens. Joining every line's token contents with
/// `\n` reproduces the input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedCode {
    /// Canonical language of the grammar used (`plaintext` for the fallback)
    pub language: String,
    pub lines: Vec<Vec<Token>>,
}

impl TokenizedCode {
    /// Raw text as one unstyled token per non-empty line
    pub fn plain(code: &str) -> Self {
        let lines = code
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Token {
                        content: line.to_string(),
                        style: DualStyle::default(),
                    }]
                }
            })
            .collect();

        Self {
            language: PLAINTEXT.to_string(),
            lines,
        }
    }

    /// Reassemble the source text from the tokens
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(|t| t.content.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.lines.iter().flatten()
    }
}

/// Append to a line, extending the last token when the style is unchanged
pub(crate) fn push_merged(line: &mut Vec<Token>, content: &str, style: DualStyle) {
    if let Some(last) = line.last_mut().filter(|t| t.style == style) {
        last.content.push_str(content);
        return;
    }
    line.push(Token {
        content: content.to_string(),
        style,
    });
}
