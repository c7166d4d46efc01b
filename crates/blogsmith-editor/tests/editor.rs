mod common;

use std::rc::Rc;
use std::time::Instant;

use blogsmith_editor::{Cmd, Document, Editor, EditorError, MemoryClipboard, Transaction, ViewId};
use blogsmith_highlight::{ThemePair, TokenizerRegistry};
use common::{TestSource, covered, decorations_in};
use pretty_assertions::assert_eq;
use rstest::rstest;

const POST: &str = "intro\n\n```rust\nlet x = 1; // one\n```\n";
const PYTHON_POST: &str = "```python\nprint(1)  # hi\n```\n";

fn editor(post: &str, source: Rc<TestSource>) -> Editor {
    Editor::new(Document::from_text(post), common::registry(source))
        .with_clipboard(MemoryClipboard::new())
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(40)]
fn test_insert_before_block_shifts_without_tokenizing(#[case] n: usize) {
    let mut editor = editor(POST, Rc::new(TestSource::default()));
    editor.run_pending();

    let before: Vec<_> = editor.decorations().iter().cloned().collect();
    let stats = editor.sync().stats();
    assert!(!before.is_empty());

    editor
        .dispatch(Transaction::cmd(Cmd::InsertText {
            at: 0,
            text: "x".repeat(n),
        }))
        .unwrap();

    let after: Vec<_> = editor.decorations().iter().cloned().collect();
    let shifted: Vec<_> = before
        .iter()
        .map(|d| (d.from + n, d.to + n, d.style.clone()))
        .collect();
    assert_eq!(
        after
            .iter()
            .map(|d| (d.from, d.to, d.style.clone()))
            .collect::<Vec<_>>(),
        shifted
    );
    assert_eq!(editor.sync().stats().recomputations, stats.recomputations);
    assert_eq!(editor.sync().stats().blocks_tokenized, stats.blocks_tokenized);
    assert_eq!(editor.sync().stats().mapped, stats.mapped + 1);

    // A real change inside the block retokenizes
    let content = editor.document().code_blocks()[0].content.clone();
    editor
        .dispatch(Transaction::cmd(Cmd::InsertText {
            at: content.start,
            text: "// new\n".into(),
        }))
        .unwrap();
    assert_eq!(editor.sync().stats().recomputations, stats.recomputations + 1);
}

#[test]
fn test_load_for_deleted_block_is_dropped() {
    let source = Rc::new(TestSource::gated());
    let mut editor = editor(PYTHON_POST, source.clone());
    editor.run_pending();
    assert_eq!(source.fetch_count("python"), 1);

    let len = editor.document().len();
    editor
        .dispatch(Transaction::cmd(Cmd::DeleteRange { range: 0..len }))
        .unwrap();
    assert!(editor.views().is_empty());

    source.release_all();
    editor.run_pending();

    assert!(editor.decorations().is_empty());
    assert!(editor.registry().ready_engine().unwrap().is_loaded("python"));
}

#[test]
fn test_late_load_uses_positions_at_resolution() {
    let source = Rc::new(TestSource::gated());
    let mut editor = editor(PYTHON_POST, source.clone());
    editor.run_pending();
    assert!(editor.decorations().is_empty());

    editor
        .dispatch(Transaction::cmd(Cmd::InsertText {
            at: 0,
            text: "Intro\n\n".into(),
        }))
        .unwrap();
    assert_eq!(editor.views()[0].pos(), 7);

    source.release_all();
    editor.run_pending();

    let content = editor.document().code_blocks()[0].content.clone();
    let decorations = decorations_in(&editor, content);
    assert_eq!(decorations.len(), editor.decorations().len());
    assert!(
        decorations
            .iter()
            .any(|d| covered(&editor, d) == "# hi" && d.style.contains("font-style:italic"))
    );
}

#[test]
fn test_load_for_replaced_language_is_dropped() {
    let source = Rc::new(TestSource::gated());
    let mut editor = editor(PYTHON_POST, source.clone());
    editor.run_pending();

    let view = editor.views()[0].id();
    editor.change_language(view, "rust").unwrap();
    editor.run_pending();
    let recomputations = editor.sync().stats().recomputations;

    source.release_all();
    editor.run_pending();

    // Only the rust load triggers a rehighlight
    assert_eq!(editor.sync().stats().recomputations, recomputations + 1);
    assert_eq!(editor.view(view).unwrap().language(), "rust");
}

#[test]
fn test_failing_block_does_not_affect_others() {
    let long_line = format!("let b = \"{}\";", "z".repeat(100));
    let post = format!(
        "```rust\nlet a = 1;\n```\n\n```rust\n{long_line}\n```\n\n```rust\nlet c = 3;\n```\n"
    );
    let registry = Rc::new(
        TokenizerRegistry::new(Rc::new(TestSource::default()), ThemePair::vitesse())
            .with_max_line_length(40),
    );
    let mut editor = Editor::new(Document::from_text(&post), registry)
        .with_clipboard(MemoryClipboard::new());
    editor.run_pending();

    let blocks = editor.document().code_blocks();
    assert!(!decorations_in(&editor, blocks[0].content.clone()).is_empty());
    assert!(decorations_in(&editor, blocks[1].content.clone()).is_empty());
    assert!(!decorations_in(&editor, blocks[2].content.clone()).is_empty());
    assert!(editor.sync().stats().block_failures > 0);
}

#[test]
fn test_views_follow_blocks() {
    let mut editor = editor(POST, Rc::new(TestSource::default()));
    editor.run_pending();
    assert_eq!(editor.views().len(), 1);
    let first = editor.views()[0].id();

    let len = editor.document().len();
    editor
        .dispatch(Transaction::cmd(Cmd::InsertCodeBlock {
            at: len,
            language: "py".into(),
        }))
        .unwrap();
    editor.run_pending();

    assert_eq!(editor.views().len(), 2);
    assert_eq!(editor.views()[0].id(), first);
    let second = editor.views()[1].id();
    assert_eq!(editor.view(second).unwrap().language(), "py");
    assert!(editor.registry().ready_engine().unwrap().is_loaded("python"));

    editor
        .dispatch(Transaction::cmd(Cmd::DeleteRange { range: 0..7 }))
        .unwrap();
    assert_eq!(editor.view_at(0).map(|v| v.id()), Some(first));
}

#[test]
fn test_unknown_view() {
    let mut editor = editor(POST, Rc::new(TestSource::default()));
    assert_eq!(
        editor.change_language(ViewId(99), "go").unwrap_err(),
        EditorError::UnknownView(ViewId(99))
    );
    assert!(editor.copy_code_block(ViewId(99), Instant::now()).is_err());
}

#[test]
fn test_broken_theme_leaves_editor_usable() {
    let registry = Rc::new(TokenizerRegistry::new(
        Rc::new(TestSource::default()),
        ThemePair::vitesse().with_dark_background("bad"),
    ));
    let clipboard = MemoryClipboard::new();
    let mut editor = Editor::new(Document::from_text(POST), registry.clone())
        .with_clipboard(clipboard.clone());
    editor.run_pending();

    editor
        .dispatch(Transaction::cmd(Cmd::InsertText {
            at: 0,
            text: "# Title\n\n".into(),
        }))
        .unwrap();
    let content = editor.document().code_blocks()[0].content.clone();
    editor
        .dispatch(Transaction::cmd(Cmd::InsertText {
            at: content.start,
            text: "let y = 2;\n".into(),
        }))
        .unwrap();
    editor.run_pending();

    assert!(!editor.sync().is_ready());
    assert!(!registry.is_ready());
    assert!(editor.decorations().is_empty());
    assert_eq!(registry.engines_built(), 1);

    let view = editor.views()[0].id();
    assert!(editor.copy_code_block(view, Instant::now()).unwrap());
    assert_eq!(
        clipboard.contents().as_deref(),
        Some("let y = 2;\nlet x = 1; // one")
    );

    editor.change_language(view, "go").unwrap();
    editor.run_pending();
    assert_eq!(editor.view(view).unwrap().language(), "go");
    assert!(editor.document().text().contains("```go\nlet y"));
    assert!(editor.view(view).unwrap().theme_vars().is_none());
    assert!(editor.decorations().is_empty());
}
