//! Lazily built highlighter with on-demand grammar loading
//!
//! The registry is an explicitly owned context (usually behind an `Rc`)
//! rather than a process global. Construction of the [`Highlighter`] and
//! every per-language load are memoized as shared futures, so callers that
//! overlap converge on one in-flight operation and one result.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::aliases;
use crate::engine::{DEFAULT_MAX_LINE_LENGTH, Highlighter};
use crate::error::HighlightError;
use crate::source::GrammarSource;
use crate::theme::ThemePair;
use crate::token::TokenizedCode;

pub type EngineResult = Result<Rc<Highlighter>, HighlightError>;
type EngineFuture = Shared<LocalBoxFuture<'static, EngineResult>>;
type LoadFuture = Shared<LocalBoxFuture<'static, Result<LoadOutcome, HighlightError>>>;

/// What a language load did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The grammar was registered before this request
    AlreadyLoaded,
    /// The grammar was fetched and registered
    Loaded,
    /// No loader exists for the language; it will render as plain text
    NoLoader,
}

pub struct TokenizerRegistry {
    source: Rc<dyn GrammarSource>,
    themes: ThemePair,
    max_line_length: usize,
    engine: RefCell<Option<EngineFuture>>,
    in_flight: RefCell<HashMap<String, LoadFuture>>,
    builds: Rc<Cell<usize>>,
}

impl TokenizerRegistry {
    pub fn new(source: Rc<dyn GrammarSource>, themes: ThemePair) -> Self {
        Self {
            source,
            themes,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            engine: RefCell::new(None),
            in_flight: RefCell::new(HashMap::new()),
            builds: Rc::new(Cell::new(0)),
        }
    }

    /// Applies to the engine built after this call
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn themes(&self) -> &ThemePair {
        &self.themes
    }

    /// Languages the grammar source can load
    pub fn languages(&self) -> Vec<String> {
        self.source.languages()
    }

    /// The engine, built on first use
    ///
    /// All callers share one construction; the returned future resolves to
    /// the same `Rc<Highlighter>` every time.
    pub fn engine(&self) -> EngineFuture {
        let mut slot = self.engine.borrow_mut();
        if let Some(engine) = slot.as_ref() {
            return engine.clone();
        }

        let themes = self.themes.clone();
        let builds = Rc::clone(&self.builds);
        let max_line_length = self.max_line_length;
        let engine = async move {
            builds.set(builds.get() + 1);
            match Highlighter::new(&themes) {
                Ok(highlighter) => {
                    log::info!(
                        "Highlighter ready with themes {} and {}",
                        themes.light.name,
                        themes.dark.name
                    );
                    Ok(Rc::new(highlighter.with_max_line_length(max_line_length)))
                }
                Err(e) => {
                    log::warn!("Failed to build highlighter: {e}");
                    Err(e)
                }
            }
        }
        .boxed_local()
        .shared();

        *slot = Some(engine.clone());
        engine
    }

    /// True once the engine has been built successfully
    pub fn is_ready(&self) -> bool {
        self.ready_engine().is_some()
    }

    pub fn ready_engine(&self) -> Option<Rc<Highlighter>> {
        let slot = self.engine.borrow();
        match slot.as_ref()?.peek()? {
            Ok(engine) => Some(Rc::clone(engine)),
            Err(_) => None,
        }
    }

    /// How many times engine construction has run
    pub fn engines_built(&self) -> usize {
        self.builds.get()
    }

    /// Make sure the grammar for `language` (or its alias) is registered
    ///
    /// Concurrent loads of the same canonical language share one fetch.
    pub fn load_language(
        &self,
        language: &str,
    ) -> LocalBoxFuture<'static, Result<LoadOutcome, HighlightError>> {
        let canonical = aliases::resolve(language).to_string();

        let mut in_flight = self.in_flight.borrow_mut();
        in_flight.retain(|_, load| load.peek().is_none());
        if let Some(load) = in_flight.get(&canonical) {
            return load.clone().boxed_local();
        }

        let engine = self.engine();
        let source = Rc::clone(&self.source);
        let name = canonical.clone();
        let load = async move {
            let engine = engine.await?;
            if engine.is_loaded(&name) {
                return Ok(LoadOutcome::AlreadyLoaded);
            }
            let Some(fetch) = source.fetch(&name) else {
                log::debug!("No grammar loader for {name}, using plain text");
                return Ok(LoadOutcome::NoLoader);
            };

            let spec = fetch.await?;
            engine.register(&name, spec)?;
            log::info!("Loaded grammar {name}");
            Ok(LoadOutcome::Loaded)
        }
        .boxed_local()
        .shared();

        in_flight.insert(canonical, load.clone());
        load.boxed_local()
    }

    /// Tokenize `code`, loading its language first
    ///
    /// Never fails: any engine, fetch or tokenization error degrades to the
    /// raw text as unstyled lines.
    pub async fn tokenize(&self, code: &str, language: &str) -> TokenizedCode {
        match self.try_tokenize(code, language).await {
            Ok(tokens) => tokens,
            Err(e) => {
                log::warn!("Highlighting {language} failed, showing plain text: {e}");
                TokenizedCode::plain(code)
            }
        }
    }

    async fn try_tokenize(&self, code: &str, language: &str) -> Result<TokenizedCode, HighlightError> {
        let engine = self.engine().await?;
        if let Err(e) = self.load_language(language).await {
            log::warn!("Grammar for {language} unavailable: {e}");
        }
        engine.tokenize(code, language)
    }
}
