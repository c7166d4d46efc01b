//! Transactions: a batch of commands plus selection and metadata

use std::collections::BTreeSet;
use std::ops::Range;

use crate::commands::Cmd;

/// Flags attached to a transaction for listeners
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Meta {
    /// Force code block decorations to be recomputed
    Rehighlight,
    /// Free-form marker (e.g. the origin of an edit)
    Tag(String),
}

/// One document transition
///
/// Commands apply in order, each against the text the previous one left.
/// A transaction without commands changes nothing but may still carry
/// metadata or a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub cmds: Vec<Cmd>,
    pub selection: Option<Range<usize>>,
    pub meta: BTreeSet<Meta>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transaction holding a single command
    pub fn cmd(cmd: Cmd) -> Self {
        Self::new().with_cmd(cmd)
    }

    /// An edit-free transaction asking for decorations to be recomputed
    pub fn rehighlight() -> Self {
        Self::new().with_meta(Meta::Rehighlight)
    }

    pub fn with_cmd(mut self, cmd: Cmd) -> Self {
        self.cmds.push(cmd);
        self
    }

    pub fn with_selection(mut self, selection: Range<usize>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta.insert(meta);
        self
    }

    pub fn has_meta(&self, meta: &Meta) -> bool {
        self.meta.contains(meta)
    }
}
