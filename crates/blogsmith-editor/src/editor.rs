//! Editor harness: one document, its decoration synchronizer, the mounted
//! code block views and a single-threaded pool for their background work
//!
//! Background tasks never touch editor state. They push an outcome onto a
//! queue, and [`Editor::run_pending`] applies outcomes against the state that
//! is current when it runs.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::time::{Duration, Instant};

use blogsmith_highlight::registry::EngineResult;
use blogsmith_highlight::{ThemeVars, TokenizerRegistry};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::code_block_view::{CodeBlockView, DEFAULT_COPY_FEEDBACK, ViewId};
use crate::decoration::DecorationSet;
use crate::document::Document;
use crate::error::EditorError;
use crate::patch::Patch;
use crate::sync::DecorationSync;
use crate::transaction::Transaction;

enum TaskOutcome {
    EngineReady(EngineResult),
    LanguageReady {
        view: ViewId,
        language: String,
        vars: Option<ThemeVars>,
    },
}

type Outcomes = Rc<RefCell<VecDeque<TaskOutcome>>>;

pub struct Editor {
    doc: Document,
    sync: DecorationSync,
    registry: Rc<TokenizerRegistry>,
    /// Mounted views in document order
    views: Vec<CodeBlockView>,
    next_id: u64,
    pool: LocalPool,
    outcomes: Outcomes,
    clipboard: Box<dyn Clipboard>,
    copy_feedback: Duration,
}

impl Editor {
    /// Open `doc`, mount a view per code block and start building the
    /// highlighter in the background
    pub fn new(doc: Document, registry: Rc<TokenizerRegistry>) -> Self {
        let mut editor = Self {
            doc,
            sync: DecorationSync::new(),
            registry,
            views: Vec::new(),
            next_id: 1,
            pool: LocalPool::new(),
            outcomes: Rc::new(RefCell::new(VecDeque::new())),
            clipboard: Box::new(SystemClipboard),
            copy_feedback: DEFAULT_COPY_FEEDBACK,
        };

        let engine = editor.registry.engine();
        let outcomes = Rc::clone(&editor.outcomes);
        editor.spawn(async move {
            let result = engine.await;
            outcomes.borrow_mut().push_back(TaskOutcome::EngineReady(result));
        });
        editor.reconcile_views(None);
        editor
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_copy_feedback(mut self, copy_feedback: Duration) -> Self {
        self.copy_feedback = copy_feedback;
        for view in &mut self.views {
            view.set_copy_feedback(copy_feedback);
        }
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn decorations(&self) -> &DecorationSet {
        self.sync.decorations()
    }

    pub fn sync(&self) -> &DecorationSync {
        &self.sync
    }

    pub fn registry(&self) -> &Rc<TokenizerRegistry> {
        &self.registry
    }

    pub fn views(&self) -> &[CodeBlockView] {
        &self.views
    }

    pub fn view(&self, id: ViewId) -> Option<&CodeBlockView> {
        self.views.iter().find(|v| v.id() == id)
    }

    /// The view bound to the block starting at `pos`
    pub fn view_at(&self, pos: usize) -> Option<&CodeBlockView> {
        self.views.iter().find(|v| v.pos() == pos)
    }

    /// Apply a transaction and let the synchronizer and views react
    pub fn dispatch(&mut self, tx: Transaction) -> Result<Patch, EditorError> {
        let old_selection = self.doc.selection();
        let patch = self.doc.apply(&tx)?;
        self.sync.apply(&tx, &patch, &old_selection, &self.doc);
        self.reconcile_views(Some(&patch));
        Ok(patch)
    }

    /// Run background work until it stalls, applying what it reports
    pub fn run_pending(&mut self) {
        loop {
            self.pool.run_until_stalled();
            let Some(outcome) = self.outcomes.borrow_mut().pop_front() else {
                break;
            };
            self.apply_outcome(outcome);
        }
    }

    /// Persist a language chosen in a view's selector
    pub fn change_language(&mut self, view: ViewId, language: &str) -> Result<Patch, EditorError> {
        let tx = self
            .view(view)
            .ok_or(EditorError::UnknownView(view))?
            .select_language(language);
        self.dispatch(tx)
    }

    /// Copy a view's block text; false when the clipboard refused it
    pub fn copy_code_block(&mut self, view: ViewId, now: Instant) -> Result<bool, EditorError> {
        let target = self
            .views
            .iter_mut()
            .find(|v| v.id() == view)
            .ok_or(EditorError::UnknownView(view))?;
        Ok(target.copy(&self.doc, self.clipboard.as_mut(), now))
    }

    fn apply_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::EngineReady(Ok(engine)) => {
                self.sync.on_engine_ready(engine, &self.doc);
            }
            TaskOutcome::EngineReady(Err(e)) => {
                log::warn!("Highlighter unavailable, code blocks stay plain: {e}");
            }
            TaskOutcome::LanguageReady {
                view,
                language,
                vars,
            } => {
                let current = self
                    .views
                    .iter_mut()
                    .find(|v| v.id() == view && v.language() == language);
                let Some(current) = current else {
                    log::debug!("Dropping stale {language} load for view {view:?}");
                    return;
                };
                if let Some(vars) = vars {
                    current.set_theme_vars(vars);
                }
                if let Err(e) = self.dispatch(Transaction::rehighlight()) {
                    log::warn!("Rehighlight after loading {language} failed: {e}");
                }
            }
        }
    }

    /// Rebind views to blocks after an edit
    ///
    /// A view follows its block through the edit's mapping and is dropped
    /// when no block starts where it lands. Blocks without a view get one.
    fn reconcile_views(&mut self, patch: Option<&Patch>) {
        let blocks = self.doc.code_blocks();
        let mut views = std::mem::take(&mut self.views);
        let mut bound = HashSet::new();
        let mut loads = Vec::new();

        views.retain_mut(|view| {
            if let Some(patch) = patch {
                view.remap(&patch.mapping);
            }
            let block = blocks
                .iter()
                .find(|b| b.start() == view.pos() && !bound.contains(&b.start()));
            let Some(block) = block else {
                log::debug!("Unmounting code block view {:?}", view.id());
                return false;
            };
            bound.insert(block.start());
            if view.sync_language(block) {
                loads.push((view.id(), view.language().to_string()));
            }
            true
        });

        for block in blocks.iter().filter(|b| !bound.contains(&b.start())) {
            let view = CodeBlockView::mount(ViewId(self.next_id), block, self.copy_feedback);
            self.next_id += 1;
            loads.push((view.id(), view.language().to_string()));
            views.push(view);
        }

        views.sort_by_key(CodeBlockView::pos);
        self.views = views;

        for (view, language) in loads {
            self.spawn_language_load(view, language);
        }
    }

    /// Load a view's language and fetch the theme colours for its chrome
    fn spawn_language_load(&self, view: ViewId, language: String) {
        let registry = Rc::clone(&self.registry);
        let outcomes = Rc::clone(&self.outcomes);
        self.spawn(async move {
            if let Err(e) = registry.load_language(&language).await {
                log::warn!("Loading {language} failed, it will render as plain text: {e}");
            }
            let vars = registry.engine().await.ok().map(|engine| engine.theme_vars());
            outcomes.borrow_mut().push_back(TaskOutcome::LanguageReady {
                view,
                language,
                vars,
            });
        });
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        if let Err(e) = self.pool.spawner().spawn_local(task) {
            log::warn!("Failed to spawn editor task: {e}");
        }
    }
}
