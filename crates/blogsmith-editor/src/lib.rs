/*!
 * # Post editor core
 *
 * A Markdown post lives in one `xi_rope::Rope`. Edits are `Cmd`s grouped in
 * `Transaction`s; applying one yields a `Patch` carrying the `Mapping` from
 * old to new positions.
 *
 * Fenced code blocks are derived from the text on demand and addressed by
 * position. On top of the document sit:
 *
 * - `DecorationSync`, which turns highlighter tokens into inline style
 *   decorations and keeps them positioned across edits
 * - `CodeBlockView`, one per block, with the language selector and copy
 *   action
 * - `Editor`, which owns all of the above plus the local task pool that
 *   builds the highlighter and loads grammars in the background
 */

pub mod clipboard;
pub mod code_block_view;
pub mod commands;
pub mod decoration;
pub mod document;
pub mod editor;
pub mod error;
pub mod fence;
pub mod mapping;
pub mod patch;
pub mod sync;
pub mod transaction;

// Re-export key types for easier usage
pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use code_block_view::{
    CodeBlockView, DEFAULT_COPY_FEEDBACK, DEFAULT_LANGUAGE, LANGUAGE_OPTIONS, ViewId,
};
pub use commands::Cmd;
pub use decoration::{Decoration, DecorationSet};
pub use document::{CodeBlock, Document, scan_code_blocks};
pub use editor::Editor;
pub use error::EditorError;
pub use fence::{CodeFence, FenceKind};
pub use mapping::{Assoc, Mapping};
pub use patch::Patch;
pub use sync::{DecorationSync, SyncState, SyncStats};
pub use transaction::{Meta, Transaction};
