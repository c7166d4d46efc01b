#![allow(dead_code)]

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use blogsmith_editor::{Decoration, Editor};
use blogsmith_highlight::{BuiltinGrammars, GrammarFetch, GrammarSource, HighlightError, ThemePair, TokenizerRegistry};
use futures::FutureExt;
use futures::channel::oneshot;

/// Builtin grammars that count fetches and, when gated, hold them until
/// released
#[derive(Default)]
pub struct TestSource {
    pub gated: bool,
    pub fetches: RefCell<Vec<String>>,
    gates: RefCell<Vec<oneshot::Sender<()>>>,
}

impl TestSource {
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    pub fn release_all(&self) {
        for gate in self.gates.borrow_mut().drain(..) {
            let _ = gate.send(());
        }
    }

    pub fn fetch_count(&self, canonical: &str) -> usize {
        self.fetches.borrow().iter().filter(|f| *f == canonical).count()
    }
}

impl GrammarSource for TestSource {
    fn languages(&self) -> Vec<String> {
        BuiltinGrammars.languages()
    }

    fn fetch(&self, canonical: &str) -> Option<GrammarFetch> {
        let inner = BuiltinGrammars.fetch(canonical)?;
        self.fetches.borrow_mut().push(canonical.to_string());
        if !self.gated {
            return Some(inner);
        }

        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push(tx);
        let name = canonical.to_string();
        Some(
            async move {
                rx.await.map_err(|_| HighlightError::Fetch {
                    name,
                    message: "gate dropped".to_string(),
                })?;
                inner.await
            }
            .boxed_local(),
        )
    }
}

pub fn registry(source: Rc<TestSource>) -> Rc<TokenizerRegistry> {
    Rc::new(TokenizerRegistry::new(source, ThemePair::vitesse()))
}

/// Decorations that fall inside `range`
pub fn decorations_in(editor: &Editor, range: Range<usize>) -> Vec<Decoration> {
    editor
        .decorations()
        .iter()
        .filter(|d| range.start <= d.from && d.to <= range.end)
        .cloned()
        .collect()
}

/// The document text under a decoration
pub fn covered(editor: &Editor, decoration: &Decoration) -> String {
    editor
        .document()
        .slice(decoration.from..decoration.to)
        .into_owned()
}
