//! Interactive unit bound to one code block: language selector, copy button
//! and the block chrome's theme colours

use std::time::{Duration, Instant};

use blogsmith_highlight::ThemeVars;

use crate::clipboard::Clipboard;
use crate::commands::Cmd;
use crate::document::{CodeBlock, Document};
use crate::mapping::{Assoc, Mapping};
use crate::transaction::{Meta, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Shown and loaded when a block has no language
pub const DEFAULT_LANGUAGE: &str = "text";

/// How long the copy button shows its confirmation
pub const DEFAULT_COPY_FEEDBACK: Duration = Duration::from_millis(2000);

/// Entries of the language selector as (label, value)
pub const LANGUAGE_OPTIONS: &[(&str, &str)] = &[
    ("Plain Text", "text"),
    ("Bash", "bash"),
    ("C", "c"),
    ("C++", "cpp"),
    ("C#", "csharp"),
    ("CSS", "css"),
    ("Dockerfile", "dockerfile"),
    ("Go", "go"),
    ("HTML", "html"),
    ("Java", "java"),
    ("JavaScript", "javascript"),
    ("JSON", "json"),
    ("JSX", "jsx"),
    ("Kotlin", "kotlin"),
    ("Markdown", "markdown"),
    ("PHP", "php"),
    ("Python", "python"),
    ("Ruby", "ruby"),
    ("Rust", "rust"),
    ("Shell", "shell"),
    ("SQL", "sql"),
    ("Swift", "swift"),
    ("TSX", "tsx"),
    ("TypeScript", "typescript"),
    ("XML", "xml"),
    ("YAML", "yaml"),
];

#[derive(Debug, Clone)]
pub struct CodeBlockView {
    id: ViewId,
    /// Start of the bound block's opening fence
    pos: usize,
    /// The block's language attribute as written
    language: String,
    theme_vars: Option<ThemeVars>,
    copied_at: Option<Instant>,
    copy_feedback: Duration,
}

impl CodeBlockView {
    pub(crate) fn mount(id: ViewId, block: &CodeBlock, copy_feedback: Duration) -> Self {
        log::debug!("Mounting code block view {id:?} at {}", block.start());
        Self {
            id,
            pos: block.start(),
            language: block.language.clone(),
            theme_vars: None,
            copied_at: None,
            copy_feedback,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Selected language, `text` when the block has none
    pub fn language(&self) -> &str {
        if self.language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            &self.language
        }
    }

    /// Label of the selected language for the selector
    pub fn language_label(&self) -> &str {
        LANGUAGE_OPTIONS
            .iter()
            .find(|(_, value)| *value == self.language())
            .map_or(self.language(), |(label, _)| *label)
    }

    /// The edit that persists `language` onto this view's block
    pub fn select_language(&self, language: &str) -> Transaction {
        Transaction::cmd(Cmd::SetCodeLanguage {
            block_start: self.pos,
            language: language.to_string(),
        })
        .with_meta(Meta::Rehighlight)
    }

    /// Put the block's text on the clipboard
    ///
    /// Returns whether the text was written. Failures only disable the
    /// confirmation.
    pub fn copy(&mut self, doc: &Document, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        let Some(block) = doc.code_block_at(self.pos) else {
            log::warn!("Code block view {:?} lost its block", self.id);
            return false;
        };

        match clipboard.write_text(&block.text) {
            Ok(()) => {
                self.copied_at = Some(now);
                true
            }
            Err(e) => {
                log::warn!("Copying code block failed: {e}");
                false
            }
        }
    }

    /// Whether the copy confirmation is showing at `now`
    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.copy_feedback)
    }

    pub fn theme_vars(&self) -> Option<&ThemeVars> {
        self.theme_vars.as_ref()
    }

    /// Inline style for the block chrome, empty until theme colours arrive
    pub fn chrome_style(&self) -> String {
        self.theme_vars
            .as_ref()
            .map(ThemeVars::to_css)
            .unwrap_or_default()
    }

    pub(crate) fn set_theme_vars(&mut self, vars: ThemeVars) {
        self.theme_vars = Some(vars);
    }

    pub(crate) fn set_copy_feedback(&mut self, copy_feedback: Duration) {
        self.copy_feedback = copy_feedback;
    }

    pub(crate) fn remap(&mut self, mapping: &Mapping) {
        self.pos = mapping.map(self.pos, Assoc::After);
    }

    /// Pick up the block's current language; true when it changed
    pub(crate) fn sync_language(&mut self, block: &CodeBlock) -> bool {
        if self.language == block.language {
            return false;
        }
        self.language = block.language.clone();
        true
    }
}
