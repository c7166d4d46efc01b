use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::document::CodeBlock;
use crate::error::EditorError;
use crate::fence::FenceKind;

/// Edit commands. Every command compiles to one delta against the text it
/// is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
    /// Rewrite the language word of the code block starting at `block_start`
    SetCodeLanguage { block_start: usize, language: String },
    /// Insert an empty fenced block, on its own lines, at `at`
    InsertCodeBlock { at: usize, language: String },
}

pub(crate) struct Compiled {
    pub delta: Delta<RopeInfo>,
    /// Caret position the command asks for, in post-edit coordinates
    pub caret: Option<usize>,
}

pub(crate) fn compile_command(
    text: &str,
    blocks: &[CodeBlock],
    cmd: &Cmd,
) -> Result<Compiled, EditorError> {
    let len = text.len();
    let mut builder = Builder::new(len);
    let mut caret = None;

    match cmd {
        Cmd::InsertText { at, text: inserted } => {
            check_range(text, *at..*at)?;
            builder.replace(*at..*at, Rope::from(inserted.as_str()));
        }
        Cmd::DeleteRange { range } => {
            check_range(text, range.clone())?;
            builder.delete(range.clone());
        }
        Cmd::ReplaceRange {
            range,
            text: inserted,
        } => {
            check_range(text, range.clone())?;
            builder.replace(range.clone(), Rope::from(inserted.as_str()));
        }
        Cmd::SetCodeLanguage {
            block_start,
            language,
        } => {
            let block = blocks
                .iter()
                .find(|b| b.range.start == *block_start)
                .ok_or(EditorError::NoCodeBlock { pos: *block_start })?;
            check_language(language, block.fence)?;
            builder.replace(block.language_range.clone(), Rope::from(language.as_str()));
        }
        Cmd::InsertCodeBlock { at, language } => {
            check_range(text, *at..*at)?;
            check_language(language, FenceKind::Backticks)?;

            let prefix = if *at > 0 && !text[..*at].ends_with('\n') {
                "\n"
            } else {
                ""
            };
            let suffix = if *at < len { "\n" } else { "" };
            let block = format!("{prefix}```{language}\n\n```{suffix}");
            builder.replace(*at..*at, Rope::from(block));
            caret = Some(at + prefix.len() + 3 + language.len() + 1);
        }
    }

    Ok(Compiled {
        delta: builder.build(),
        caret,
    })
}

fn check_range(text: &str, range: Range<usize>) -> Result<(), EditorError> {
    let valid = range.start <= range.end
        && range.end <= text.len()
        && text.is_char_boundary(range.start)
        && text.is_char_boundary(range.end);
    if valid {
        Ok(())
    } else {
        Err(EditorError::InvalidRange {
            range,
            len: text.len(),
        })
    }
}

/// A language must stay a single word of the fence's info string
///
/// A leading fence character would lengthen the fence run itself.
fn check_language(language: &str, fence: FenceKind) -> Result<(), EditorError> {
    let breaks_fence = language.starts_with(fence.char())
        || (fence == FenceKind::Backticks && language.contains('`'));
    if language.contains(char::is_whitespace) || breaks_fence {
        return Err(EditorError::InvalidLanguage {
            language: language.to_string(),
        });
    }
    Ok(())
}
