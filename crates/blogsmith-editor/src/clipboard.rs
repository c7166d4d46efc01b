//! System clipboard access behind a trait so views can be driven headless

use std::cell::RefCell;
use std::rc::Rc;

use arboard::Clipboard as Arboard;

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The desktop clipboard, opened on each write
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        Arboard::new().and_then(|mut c| c.set_text(text))?;
        Ok(())
    }
}

/// Keeps the last written text in memory
///
/// Clones share the same contents, so a test can keep a handle while the
/// editor owns another.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}
