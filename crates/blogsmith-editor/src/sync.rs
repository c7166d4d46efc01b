//! Keeps code block highlight decorations in step with the document
//!
//! The synchronizer starts `Uninitialized` and emits nothing until the
//! highlighter is ready. From then on every transition either recomputes
//! decorations for the whole document or, when no code block was affected,
//! maps the previous set through the transition.

use std::ops::Range;
use std::rc::Rc;

use blogsmith_highlight::{CodeTokenizer, PLAINTEXT};

use crate::decoration::{Decoration, DecorationSet};
use crate::document::{CodeBlock, Document};
use crate::mapping::Assoc;
use crate::patch::Patch;
use crate::transaction::{Meta, Transaction};

pub enum SyncState {
    Uninitialized,
    Ready(Rc<dyn CodeTokenizer>),
}

/// Work counters, for observing when tokenization actually ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub recomputations: usize,
    pub mapped: usize,
    pub blocks_tokenized: usize,
    pub block_failures: usize,
}

pub struct DecorationSync {
    state: SyncState,
    decorations: DecorationSet,
    stats: SyncStats,
}

impl Default for DecorationSync {
    fn default() -> Self {
        Self::new()
    }
}

impl DecorationSync {
    pub fn new() -> Self {
        Self {
            state: SyncState::Uninitialized,
            decorations: DecorationSet::empty(),
            stats: SyncStats::default(),
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SyncState::Ready(_))
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Become ready and decorate the document as it is now
    pub fn on_engine_ready(&mut self, tokenizer: Rc<dyn CodeTokenizer>, doc: &Document) {
        self.state = SyncState::Ready(tokenizer);
        self.recompute(doc);
    }

    /// React to a document transition
    ///
    /// `doc` is the document after `patch`; `old_selection` is the selection
    /// before it.
    pub fn apply(
        &mut self,
        tx: &Transaction,
        patch: &Patch,
        old_selection: &Range<usize>,
        doc: &Document,
    ) -> &DecorationSet {
        if !self.is_ready() {
            self.decorations = DecorationSet::empty();
            return &self.decorations;
        }

        let recompute = patch.touched_code_block
            || tx.has_meta(&Meta::Rehighlight)
            || crosses_code_block(patch, old_selection, doc);

        if recompute {
            self.recompute(doc);
        } else {
            self.decorations = self.decorations.map(&patch.mapping);
            self.stats.mapped += 1;
        }
        &self.decorations
    }

    fn recompute(&mut self, doc: &Document) {
        let SyncState::Ready(tokenizer) = &self.state else {
            return;
        };

        let mut decorations = Vec::new();
        for block in doc.code_blocks() {
            match decorate_block(tokenizer.as_ref(), &block) {
                Ok(block_decorations) => {
                    self.stats.blocks_tokenized += 1;
                    decorations.extend(block_decorations);
                }
                Err(e) => {
                    self.stats.block_failures += 1;
                    log::warn!(
                        "Highlighting code block at {} ({}) failed, leaving it plain: {e}",
                        block.start(),
                        block.language
                    );
                }
            }
        }

        self.decorations = DecorationSet::new(decorations);
        self.stats.recomputations += 1;
    }
}

/// Whether the selection head moved into or out of a code block
fn crosses_code_block(patch: &Patch, old_selection: &Range<usize>, doc: &Document) -> bool {
    let old_head = patch.mapping.map(old_selection.end, Assoc::After);
    let new_head = patch.new_selection.end;
    if old_head == new_head {
        return false;
    }

    doc.code_blocks().iter().any(|block| {
        block.content_contains(old_head) != block.content_contains(new_head)
    })
}

fn decorate_block(
    tokenizer: &dyn CodeTokenizer,
    block: &CodeBlock,
) -> Result<Vec<Decoration>, blogsmith_highlight::HighlightError> {
    let language = if !block.language.is_empty() && tokenizer.has_language(&block.language) {
        block.language.as_str()
    } else {
        PLAINTEXT
    };
    let tokens = tokenizer.tokenize_code(&block.text, language)?;

    let mut decorations = Vec::new();
    let mut pos = block.content.start;
    for line in &tokens.lines {
        for token in line {
            let from = pos;
            pos += token.content.len();
            let style = token.style.to_css();
            if !style.is_empty() {
                decorations.push(Decoration::new(from, pos, style));
            }
        }
        pos += 1;
    }
    Ok(decorations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Cmd;
    use blogsmith_highlight::{BuiltinGrammars, GrammarSource, Highlighter, ThemePair};
    use pretty_assertions::assert_eq;

    const POST: &str = "intro\n\n```rust\nlet x = 1; // one\n```\n";

    fn rust_engine() -> Rc<Highlighter> {
        let highlighter = Highlighter::new(&ThemePair::vitesse()).unwrap();
        let spec = BuiltinGrammars
            .fetch("rust")
            .map(futures::executor::block_on)
            .unwrap()
            .unwrap();
        highlighter.register("rust", spec).unwrap();
        Rc::new(highlighter)
    }

    fn step(sync: &mut DecorationSync, doc: &mut Document, tx: Transaction) {
        let old_selection = doc.selection();
        let patch = doc.apply(&tx).unwrap();
        sync.apply(&tx, &patch, &old_selection, doc);
    }

    #[test]
    fn test_uninitialized_emits_nothing() {
        let mut sync = DecorationSync::new();
        let mut doc = Document::from_text(POST);
        step(&mut sync, &mut doc, Transaction::rehighlight());

        assert!(!sync.is_ready());
        assert!(sync.decorations().is_empty());
        assert_eq!(sync.stats(), SyncStats::default());
    }

    #[test]
    fn test_ready_decorates_code_only() {
        let mut sync = DecorationSync::new();
        let doc = Document::from_text(POST);
        sync.on_engine_ready(rust_engine(), &doc);

        let block = &doc.code_blocks()[0];
        assert!(!sync.decorations().is_empty());
        assert!(
            sync.decorations()
                .iter()
                .all(|d| block.content.start <= d.from && d.to <= block.content.end)
        );

        let text = doc.text();
        let comment = sync
            .decorations()
            .iter()
            .find(|d| &text[d.from..d.to] == "// one")
            .unwrap();
        assert!(comment.style.contains("font-style:italic"));
        assert_eq!(sync.stats().recomputations, 1);
    }

    #[test]
    fn test_edit_outside_blocks_maps() {
        let mut sync = DecorationSync::new();
        let mut doc = Document::from_text(POST);
        doc.set_selection(0..0);
        sync.on_engine_ready(rust_engine(), &doc);
        let before = sync.decorations().clone();

        step(
            &mut sync,
            &mut doc,
            Transaction::cmd(Cmd::InsertText {
                at: 0,
                text: "ab".into(),
            }),
        );

        let shifted: Vec<_> = before.iter().map(|d| (d.from + 2, d.to + 2)).collect();
        let after: Vec<_> = sync.decorations().iter().map(|d| (d.from, d.to)).collect();
        assert_eq!(after, shifted);
        assert_eq!(sync.stats().recomputations, 1);
        assert_eq!(sync.stats().mapped, 1);
    }

    #[test]
    fn test_selection_entering_block_recomputes() {
        let mut sync = DecorationSync::new();
        let mut doc = Document::from_text(POST);
        doc.set_selection(0..0);
        sync.on_engine_ready(rust_engine(), &doc);

        step(&mut sync, &mut doc, Transaction::new().with_selection(17..17));
        assert_eq!(sync.stats().recomputations, 2);

        step(&mut sync, &mut doc, Transaction::new().with_selection(18..18));
        assert_eq!(sync.stats().recomputations, 2);
        assert_eq!(sync.stats().mapped, 1);
    }

    #[test]
    fn test_unloaded_language_is_plain() {
        let mut sync = DecorationSync::new();
        let doc = Document::from_text("```python\nprint(1)\n```\n");
        sync.on_engine_ready(rust_engine(), &doc);

        assert!(sync.decorations().is_empty());
        assert_eq!(sync.stats().blocks_tokenized, 1);
    }
}
