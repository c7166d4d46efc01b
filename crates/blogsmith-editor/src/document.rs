use std::borrow::Cow;
use std::ops::Range;

use xi_rope::delta::{DeltaElement, Transformer};
use xi_rope::{Delta, Rope, RopeInfo};

use crate::commands::compile_command;
use crate::error::EditorError;
use crate::fence::{CodeFence, FenceKind};
use crate::mapping::{Assoc, Mapping};
use crate::patch::Patch;
use crate::transaction::Transaction;

/// A fenced code block found in the document
///
/// Identity is positional: a block is addressed by the offset of its opening
/// fence line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Opening fence line through the closing fence line (or end of document)
    pub range: Range<usize>,
    /// The language word of the info string
    pub language_range: Range<usize>,
    /// The lines between the fences, without the final line break
    pub content: Range<usize>,
    pub language: String,
    pub fence: FenceKind,
    pub closed: bool,
    pub text: String,
}

impl CodeBlock {
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Whether `pos` lies in the content, bounds included
    pub fn content_contains(&self, pos: usize) -> bool {
        self.content.start <= pos && pos <= self.content.end
    }
}

/// Find every fenced code block in `text`, in document order
pub fn scan_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut lines = line_offsets(text);

    while let Some((start, line)) = lines.next() {
        let Some(open) = CodeFence::open(line) else {
            continue;
        };
        let content_start = (start + line.len() + 1).min(text.len());

        let mut closing = None;
        for (line_start, candidate) in lines.by_ref() {
            if CodeFence::closes(&open, candidate) {
                closing = Some((line_start, candidate));
                break;
            }
        }

        let (content_end, end, closed) = match closing {
            Some((line_start, candidate)) => {
                let content_end = if line_start > content_start {
                    line_start - 1
                } else {
                    content_start
                };
                (content_end, line_start + candidate.len(), true)
            }
            None => {
                let end = text.len() - usize::from(text.ends_with('\n'));
                let end = end.max(content_start);
                (end, end, false)
            }
        };

        blocks.push(CodeBlock {
            range: start..end,
            language_range: start + open.language.start..start + open.language.end,
            content: content_start..content_end,
            language: line[open.language.clone()].to_string(),
            fence: open.kind,
            closed,
            text: text[content_start..content_end].to_string(),
        });
    }

    blocks
}

/// Lines of `text` with their byte offsets, line breaks excluded
fn line_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len() + 1;
        Some((start, line))
    })
}

/// A Markdown post being edited
///
/// The rope is the single source of truth; code blocks are derived from it
/// on demand, so they never go out of sync with the text.
pub struct Document {
    pub(crate) buffer: Rope,
    /// Current selection/cursor position as byte offsets in buffer
    pub(crate) selection: Range<usize>,
    /// Incremented on every edit that changes the text
    pub(crate) version: u64,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_text(text))
    }

    pub fn from_text(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len,
            version: 0,
        }
    }

    /// Get the document as a string
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.text().into_bytes()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Text in `range`, clamped to the document
    pub fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let end = range.end.min(self.buffer.len());
        let start = range.start.min(end);
        self.buffer.slice_to_cow(start..end)
    }

    /// Get the current selection range
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Set the selection range, clamped to the document
    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.selection = clamp(selection, self.buffer.len());
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn code_blocks(&self) -> Vec<CodeBlock> {
        scan_code_blocks(&self.text())
    }

    /// The code block whose opening fence starts at `start`
    pub fn code_block_at(&self, start: usize) -> Option<CodeBlock> {
        self.code_blocks().into_iter().find(|b| b.start() == start)
    }

    /// The code block whose content holds `pos`
    pub fn code_block_containing(&self, pos: usize) -> Option<CodeBlock> {
        self.code_blocks()
            .into_iter()
            .find(|b| b.content_contains(pos))
    }

    /// Apply a transaction
    ///
    /// All commands apply or none do: the first failing command leaves the
    /// document untouched.
    pub fn apply(&mut self, tx: &Transaction) -> Result<Patch, EditorError> {
        let old_blocks = self.code_blocks();
        let mut buffer = self.buffer.clone();
        let mut text = self.text();
        let mut blocks = old_blocks.clone();
        let mut mapping = Mapping::new();
        let mut changed: Vec<Range<usize>> = Vec::new();
        let mut caret: Option<usize> = None;
        let mut touched = false;

        for cmd in &tx.cmds {
            let compiled = compile_command(&text, &blocks, cmd)?;
            let delta = compiled.delta;
            let regions = edited_regions(&delta);

            touched |= regions
                .iter()
                .any(|(old, _)| blocks.iter().any(|b| overlaps(&b.range, old)));

            buffer = delta.apply(&buffer);
            text = buffer.to_string();
            blocks = scan_code_blocks(&text);

            touched |= regions
                .iter()
                .any(|(_, new)| blocks.iter().any(|b| overlaps(&b.range, new)));

            let mut transformer = Transformer::new(&delta);
            changed = changed
                .into_iter()
                .map(|r| {
                    let start = transformer.transform(r.start, false);
                    let end = transformer.transform(r.end, true);
                    start..end.max(start)
                })
                .collect();
            changed.extend(regions.into_iter().map(|(_, new)| new));

            caret = caret.map(|c| transformer.transform(c, true));
            if compiled.caret.is_some() {
                caret = compiled.caret;
            }

            mapping.push(delta);
        }

        touched |= signature(&old_blocks) != signature(&blocks);
        let doc_changed = !mapping.is_identity();
        let len = buffer.len();

        let new_selection = match (&tx.selection, caret) {
            (Some(selection), _) => clamp(selection.clone(), len),
            (None, Some(caret)) => caret..caret,
            (None, None) => {
                let start = mapping.map(self.selection.start, Assoc::After);
                let end = mapping.map(self.selection.end, Assoc::After);
                start..end.max(start)
            }
        };

        self.buffer = buffer;
        self.selection = new_selection.clone();
        if doc_changed {
            self.version += 1;
        }

        Ok(Patch {
            changed,
            new_selection,
            version: self.version,
            mapping,
            doc_changed,
            touched_code_block: doc_changed && touched,
        })
    }
}

/// Old and new ranges of every region a delta rewrites
fn edited_regions(delta: &Delta<RopeInfo>) -> Vec<(Range<usize>, Range<usize>)> {
    let mut regions = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;

    for el in &delta.els {
        match el {
            DeltaElement::Copy(from, to) => {
                if *from > old_pos {
                    regions.push((old_pos..*from, new_pos..new_pos));
                }
                new_pos += to - from;
                old_pos = *to;
            }
            DeltaElement::Insert(inserted) => {
                regions.push((old_pos..old_pos, new_pos..new_pos + inserted.len()));
                new_pos += inserted.len();
            }
        }
    }
    if delta.base_len > old_pos {
        regions.push((old_pos..delta.base_len, new_pos..new_pos));
    }

    regions
}

fn overlaps(block: &Range<usize>, region: &Range<usize>) -> bool {
    region.start <= block.end && region.end >= block.start
}

fn signature(blocks: &[CodeBlock]) -> Vec<(&str, &str)> {
    blocks
        .iter()
        .map(|b| (b.language.as_str(), b.text.as_str()))
        .collect()
}

fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Cmd;
    use pretty_assertions::assert_eq;

    const POST: &str = "# Post\n\n```rust\nfn main() {}\n```\n\nmore\n";

    #[test]
    fn test_from_bytes_round_trip() {
        let doc = Document::from_bytes(POST.as_bytes()).unwrap();
        assert_eq!(doc.to_bytes(), POST.as_bytes());
        assert_eq!(doc.len(), POST.len());
        assert_eq!(doc.selection(), POST.len()..POST.len());
        assert!(Document::from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_scan_closed_block() {
        let blocks = scan_code_blocks(POST);
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(block.range, 8..32);
        assert_eq!(&POST[block.range.clone()], "```rust\nfn main() {}\n```");
        assert_eq!(&POST[block.language_range.clone()], "rust");
        assert_eq!(block.language, "rust");
        assert_eq!(block.text, "fn main() {}");
        assert_eq!(&POST[block.content.clone()], "fn main() {}");
        assert!(block.closed);
    }

    #[test]
    fn test_scan_edge_shapes() {
        let empty = scan_code_blocks("```\n```");
        assert_eq!(empty[0].content, 4..4);
        assert_eq!(empty[0].text, "");
        assert_eq!(empty[0].language, "");

        let unclosed = scan_code_blocks("x\n~~~py\na\nb\n");
        assert_eq!(unclosed[0].text, "a\nb");
        assert!(!unclosed[0].closed);
        assert_eq!(unclosed[0].range.end, 11);

        let bare = scan_code_blocks("```go");
        assert_eq!(bare[0].content, 5..5);

        let two = scan_code_blocks("```a\n1\n```\n````b\n```\n````\n");
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].language, "b");
        assert_eq!(two[1].text, "```");
    }

    #[test]
    fn test_block_lookup() {
        let doc = Document::from_text(POST);
        assert!(doc.code_block_at(8).is_some());
        assert!(doc.code_block_at(9).is_none());
        assert_eq!(doc.code_block_containing(16).map(|b| b.start()), Some(8));
        assert_eq!(doc.code_block_containing(28).map(|b| b.start()), Some(8));
        assert_eq!(doc.code_block_containing(2), None);
    }

    #[test]
    fn test_apply_before_block_maps_without_touching() {
        let mut doc = Document::from_text(POST);
        doc.set_selection(2..2);
        let patch = doc
            .apply(&Transaction::cmd(Cmd::InsertText {
                at: 2,
                text: "My ".into(),
            }))
            .unwrap();

        assert!(patch.doc_changed);
        assert!(!patch.touched_code_block);
        assert_eq!(patch.changed, vec![2..5]);
        assert_eq!(patch.new_selection, 5..5);
        assert_eq!(patch.version, 1);
        assert_eq!(patch.mapping.map(8, Assoc::After), 11);
        assert_eq!(doc.code_blocks()[0].start(), 11);
    }

    #[test]
    fn test_apply_inside_block_touches() {
        let mut doc = Document::from_text(POST);
        let patch = doc
            .apply(&Transaction::cmd(Cmd::InsertText {
                at: 27,
                text: " ".into(),
            }))
            .unwrap();
        assert!(patch.touched_code_block);
        assert_eq!(doc.code_blocks()[0].text, "fn main() { }");
    }

    #[test]
    fn test_apply_creating_block_touches() {
        let mut doc = Document::from_text("text");
        let patch = doc
            .apply(&Transaction::cmd(Cmd::InsertCodeBlock {
                at: 4,
                language: "py".into(),
            }))
            .unwrap();
        assert!(patch.touched_code_block);
        assert_eq!(doc.text(), "text\n```py\n\n```");
        assert_eq!(patch.new_selection, 11..11);
        assert!(doc.code_block_containing(11).is_some());
    }

    #[test]
    fn test_apply_is_atomic() {
        let mut doc = Document::from_text("abc");
        let tx = Transaction::cmd(Cmd::InsertText {
            at: 0,
            text: "x".into(),
        })
        .with_cmd(Cmd::DeleteRange { range: 3..10 });

        assert!(doc.apply(&tx).is_err());
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_meta_only_transaction() {
        let mut doc = Document::from_text(POST);
        let patch = doc.apply(&Transaction::rehighlight()).unwrap();
        assert!(!patch.doc_changed);
        assert!(!patch.touched_code_block);
        assert_eq!(patch.version, 0);
        assert!(patch.changed.is_empty());
    }

    #[test]
    fn test_sequential_commands_use_latest_text() {
        let mut doc = Document::from_text("ab");
        let tx = Transaction::cmd(Cmd::InsertText {
            at: 2,
            text: "c".into(),
        })
        .with_cmd(Cmd::ReplaceRange {
            range: 2..3,
            text: "CD".into(),
        })
        .with_selection(0..1);

        let patch = doc.apply(&tx).unwrap();
        assert_eq!(doc.text(), "abCD");
        assert_eq!(patch.new_selection, 0..1);
        assert!(patch.changed.contains(&(2..4)));
    }
}
