//! The highlighting engine: two themes and the syntaxes loaded so far

use std::cell::RefCell;
use std::collections::HashMap;

use syntect::highlighting::Highlighter as ThemeHighlighter;
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};

use crate::aliases;
use crate::error::HighlightError;
use crate::source::GrammarSpec;
use crate::style::DualStyle;
use crate::theme::{Theme, ThemePair, ThemeVariant, ThemeVars};
use crate::token::{PLAINTEXT, TokenizedCode, push_merged};

/// Longest line, in bytes, the engine will tokenize
pub const DEFAULT_MAX_LINE_LENGTH: usize = 20_000;

/// Turns code into dual-theme tokens
///
/// This is the seam the decoration synchronizer depends on.
pub trait CodeTokenizer {
    fn tokenize_code(&self, code: &str, language: &str) -> Result<TokenizedCode, HighlightError>;

    /// Whether `language` resolves to a loaded grammar
    fn has_language(&self, language: &str) -> bool;
}

#[derive(Debug)]
pub struct Highlighter {
    light: Theme,
    dark: Theme,
    syntaxes: RefCell<SyntaxSet>,
    /// Canonical language name to its syntax's index in `syntaxes`
    loaded: RefCell<HashMap<String, usize>>,
    max_line_length: usize,
}

impl Highlighter {
    /// Build an engine with both themes and no languages loaded
    ///
    /// The bundled syntaxes are linked up front so that embedded languages
    /// (CSS inside HTML, fenced code in Markdown) resolve once their host
    /// language is loaded.
    pub fn new(themes: &ThemePair) -> Result<Self, HighlightError> {
        Ok(Self {
            light: themes.light.compile()?,
            dark: themes.dark.compile()?,
            syntaxes: RefCell::new(SyntaxSet::load_defaults_newlines()),
            loaded: RefCell::new(HashMap::new()),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        })
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn theme(&self, variant: ThemeVariant) -> &Theme {
        match variant {
            ThemeVariant::Light => &self.light,
            ThemeVariant::Dark => &self.dark,
        }
    }

    pub fn theme_vars(&self) -> ThemeVars {
        ThemeVars::new(&self.light, &self.dark)
    }

    /// Canonical names of loaded languages, sorted
    pub fn loaded_languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_loaded(&self, language: &str) -> bool {
        self.loaded.borrow().contains_key(aliases::resolve(language))
    }

    /// Make `language` tokenize with `grammar`, replacing any previous one
    ///
    /// A bundled grammar points at a syntax already in the set. A definition
    /// is added to the set, which is relinked so it can embed the syntaxes
    /// before it.
    pub fn register(&self, language: &str, grammar: GrammarSpec) -> Result<(), HighlightError> {
        let index = match grammar {
            GrammarSpec::Bundled { extension } => self
                .syntaxes
                .borrow()
                .syntaxes()
                .iter()
                .rposition(|s| s.file_extensions.iter().any(|e| *e == extension))
                .ok_or_else(|| {
                    HighlightError::grammar(language, format!("no bundled syntax for `.{extension}`"))
                })?,
            GrammarSpec::Definition(definition) => {
                let name = definition.name.clone();
                let mut syntaxes = self.syntaxes.borrow_mut();
                let mut builder = std::mem::replace(&mut *syntaxes, SyntaxSet::new()).into_builder();
                builder.add(*definition);
                *syntaxes = builder.build();
                syntaxes
                    .syntaxes()
                    .iter()
                    .rposition(|s| s.name == name)
                    .ok_or_else(|| HighlightError::grammar(language, "definition missing after build"))?
            }
        };

        log::debug!("Registered grammar {language}");
        self.loaded.borrow_mut().insert(language.to_string(), index);
        Ok(())
    }

    /// Tokenize with the loaded grammar for `language`, or plain text
    pub fn tokenize(&self, code: &str, language: &str) -> Result<TokenizedCode, HighlightError> {
        if let Some((line, text)) = code
            .split('\n')
            .enumerate()
            .find(|(_, text)| text.len() > self.max_line_length)
        {
            return Err(HighlightError::LineTooLong {
                line,
                len: text.len(),
                limit: self.max_line_length,
            });
        }

        let canonical = aliases::resolve(language);
        let Some(index) = self.loaded.borrow().get(canonical).copied() else {
            return Ok(TokenizedCode::plain(code));
        };
        let syntaxes = self.syntaxes.borrow();
        let syntax = syntaxes
            .syntaxes()
            .get(index)
            .ok_or_else(|| HighlightError::parse(canonical, "syntax is no longer in the set"))?;

        let light = ThemeHighlighter::new(self.light.syntect());
        let dark = ThemeHighlighter::new(self.dark.syntect());
        let style_at = |stack: &ScopeStack| {
            DualStyle::new(
                self.light.token_style(light.style_for_stack(stack.as_slice())),
                self.dark.token_style(dark.style_for_stack(stack.as_slice())),
            )
        };

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut buf = String::new();
        let mut lines = Vec::new();

        for text in code.split('\n') {
            // Syntaxes are loaded in newline mode
            buf.clear();
            buf.push_str(text);
            buf.push('\n');
            let ops = state
                .parse_line(&buf, &syntaxes)
                .map_err(|e| HighlightError::parse(canonical, e))?;

            let mut line = Vec::new();
            let mut start = 0;
            for (offset, op) in ops {
                let end = offset.min(text.len());
                if end > start {
                    push_merged(&mut line, &text[start..end], style_at(&stack));
                    start = end;
                }
                stack
                    .apply(&op)
                    .map_err(|e| HighlightError::parse(canonical, e))?;
            }
            if start < text.len() {
                push_merged(&mut line, &text[start..], style_at(&stack));
            }
            lines.push(line);
        }

        Ok(TokenizedCode {
            language: canonical.to_string(),
            lines,
        })
    }
}

impl CodeTokenizer for Highlighter {
    fn tokenize_code(&self, code: &str, language: &str) -> Result<TokenizedCode, HighlightError> {
        self.tokenize(code, language)
    }

    fn has_language(&self, language: &str) -> bool {
        language == PLAINTEXT || self.is_loaded(language)
    }
}
