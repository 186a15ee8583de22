#![forbid(unsafe_code)]

//! Editing session: the single owner of the current layout.
//!
//! [`EditorSession`] threads the tree through layout commands, records
//! every change in a [`SnapshotHistory`], tracks the selected cell, and
//! persists layouts and templates through a [`LayoutStore`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use splitcanvas_layout::{
    CommandKind, EditOutcome, LayoutCommand, LayoutNode, LayoutPolicy, NoOpReason, NodeFactory,
    NodeId, ResizeRequest, SplitRequest,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EditorConfig};
use crate::history::SnapshotHistory;
use crate::storage::{LayoutStore, StorageBackend, StorageError};

/// How a command resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The tree changed.
    Applied,
    /// The tree was left as is.
    Unchanged(NoOpReason),
    /// The whole tree was removed and replaced by a blank canvas.
    Emptied,
}

/// Summary of one applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub kind: CommandKind,
    pub target: NodeId,
    pub status: CommandStatus,
    /// Whether a new history entry was recorded.
    pub recorded: bool,
    /// [`LayoutNode::state_hash`] of the resulting tree.
    pub state_hash: u64,
}

impl CommandReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self.status, CommandStatus::Unchanged(_))
    }
}

/// Errors surfaced by session actions.
#[derive(Debug)]
pub enum SessionError {
    /// Rejected configuration.
    Config(ConfigError),
    /// Backend or stored-data failure.
    Storage(StorageError),
    /// No template is stored under this name.
    UnknownTemplate { name: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid editor configuration: {e}"),
            Self::Storage(e) => write!(f, "{e}"),
            Self::UnknownTemplate { name } => write!(f, "no template named {name:?}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::UnknownTemplate { .. } => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// The editor's layout state and actions.
#[derive(Debug)]
pub struct EditorSession<B> {
    tree: LayoutNode,
    policy: LayoutPolicy,
    factory: NodeFactory,
    history: SnapshotHistory<LayoutNode>,
    store: LayoutStore<B>,
    selected: Option<NodeId>,
}

impl<B: StorageBackend> EditorSession<B> {
    /// Blank session with default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::build(backend, EditorConfig::default())
    }

    /// Blank session with a validated configuration.
    pub fn with_config(backend: B, config: EditorConfig) -> Result<Self, SessionError> {
        let config = config.validated()?;
        Ok(Self::build(backend, config))
    }

    /// Session resuming the saved current layout.
    ///
    /// Unreadable saved data is logged and skipped; the session then starts
    /// from a blank canvas.
    pub fn open(backend: B, config: EditorConfig) -> Result<Self, SessionError> {
        let mut session = Self::with_config(backend, config)?;
        if let Err(error) = session.restore() {
            warn!(%error, "saved layout could not be restored; starting blank");
        }
        Ok(session)
    }

    fn build(backend: B, config: EditorConfig) -> Self {
        let tree = LayoutNode::blank_root();
        Self {
            factory: NodeFactory::for_tree(&tree),
            history: SnapshotHistory::with_initial(tree.clone(), config.history),
            store: LayoutStore::new(backend, config.storage, config.layout),
            policy: config.layout,
            selected: None,
            tree,
        }
    }

    // ====================================================================
    // Queries
    // ====================================================================

    /// Current layout.
    #[must_use]
    pub fn tree(&self) -> &LayoutNode {
        &self.tree
    }

    #[must_use]
    pub fn policy(&self) -> &LayoutPolicy {
        &self.policy
    }

    #[must_use]
    pub fn history(&self) -> &SnapshotHistory<LayoutNode> {
        &self.history
    }

    #[must_use]
    pub fn store(&self) -> &LayoutStore<B> {
        &self.store
    }

    /// Component labels already placed, for disabling palette entries.
    #[must_use]
    pub fn used_component_types(&self) -> BTreeSet<String> {
        self.tree.used_component_types()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ====================================================================
    // Editing
    // ====================================================================

    /// Apply one layout command and record the result.
    pub fn apply(&mut self, command: LayoutCommand) -> CommandReport {
        let _span = tracing::debug_span!(
            "splitcanvas.session.apply",
            op = %command.kind(),
            target = %command.target()
        )
        .entered();

        let tree = std::mem::replace(&mut self.tree, LayoutNode::blank_root());
        let outcome = command.apply(tree, &self.policy, &mut self.factory);
        let status = match outcome {
            EditOutcome::Applied(tree) => {
                self.tree = tree;
                CommandStatus::Applied
            }
            EditOutcome::Unchanged { tree, reason } => {
                self.tree = tree;
                CommandStatus::Unchanged(reason)
            }
            EditOutcome::Emptied => CommandStatus::Emptied,
        };

        let recorded = match status {
            CommandStatus::Unchanged(reason) => {
                if reason == NoOpReason::UnknownTarget {
                    warn!(%reason, "command addressed a node that is not in the layout");
                } else {
                    debug!(%reason, "command left layout unchanged");
                }
                false
            }
            CommandStatus::Applied | CommandStatus::Emptied => self.commit(),
        };
        self.drop_stale_selection();

        let state_hash = self.tree.state_hash();
        debug!(
            ?status,
            recorded,
            state_hash,
            nodes = self.tree.node_count(),
            depth = self.tree.depth(),
            "command finished"
        );
        CommandReport {
            kind: command.kind(),
            target: command.target().clone(),
            status,
            recorded,
            state_hash,
        }
    }

    /// Place or split per `request`.
    pub fn split(&mut self, request: SplitRequest) -> CommandReport {
        self.apply(LayoutCommand::Split(request))
    }

    /// One incremental resize step.
    pub fn resize(&mut self, request: ResizeRequest) -> CommandReport {
        self.apply(LayoutCommand::Resize(request))
    }

    pub fn delete(&mut self, target: NodeId) -> CommandReport {
        self.apply(LayoutCommand::Delete { target_id: target })
    }

    /// Select a node. Unknown ids are refused and clear the selection.
    pub fn select(&mut self, id: NodeId) -> bool {
        if self.tree.contains(&id) {
            self.selected = Some(id);
            true
        } else {
            self.selected = None;
            false
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Delete the selected node, if any, and clear the selection.
    pub fn delete_selected(&mut self) -> Option<CommandReport> {
        let target = self.selected.take()?;
        Some(self.delete(target))
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Step back one recorded layout. Returns whether the layout moved.
    pub fn undo(&mut self) -> bool {
        let _span = tracing::debug_span!("splitcanvas.session.undo").entered();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.adopt_snapshot(&snapshot);
        debug!(state_hash = self.tree.state_hash(), "undo");
        true
    }

    /// Step forward one undone layout. Returns whether the layout moved.
    pub fn redo(&mut self) -> bool {
        let _span = tracing::debug_span!("splitcanvas.session.redo").entered();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.adopt_snapshot(&snapshot);
        debug!(state_hash = self.tree.state_hash(), "redo");
        true
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    /// Return to a blank canvas and forget the saved current layout.
    ///
    /// The saved slot is cleared first; if that fails the canvas is left as
    /// is. The reset itself is recorded, so it can be undone in this session.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let _span = tracing::debug_span!("splitcanvas.session.reset").entered();
        let cleared = self.store.clear_current()?;
        self.replace_tree(LayoutNode::blank_root());
        info!(cleared, "layout reset");
        Ok(())
    }

    /// Persist the current layout.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let _span = tracing::debug_span!("splitcanvas.session.save").entered();
        self.store.save_current(&self.tree)?;
        Ok(())
    }

    /// Replace the session with the saved current layout, if there is one.
    ///
    /// History restarts from the restored layout. Returns whether a layout
    /// was found.
    pub fn restore(&mut self) -> Result<bool, SessionError> {
        let _span = tracing::debug_span!("splitcanvas.session.restore").entered();
        let Some(tree) = self.store.load_current()? else {
            debug!("no saved layout");
            return Ok(false);
        };
        let config = self.history.config().clone();
        self.factory.observe(&tree);
        self.history = SnapshotHistory::with_initial(tree.clone(), config);
        self.tree = tree;
        self.selected = None;
        info!(state_hash = self.tree.state_hash(), "restored saved layout");
        Ok(true)
    }

    /// Store the current layout as a template. Returns the trimmed name.
    pub fn save_template(&mut self, name: &str) -> Result<String, SessionError> {
        let _span = tracing::debug_span!("splitcanvas.session.save_template").entered();
        Ok(self.store.save_template(name, &self.tree)?)
    }

    /// Replace the current layout with a stored template (recorded in history).
    pub fn load_template(&mut self, name: &str) -> Result<(), SessionError> {
        let _span = tracing::debug_span!("splitcanvas.session.load_template").entered();
        let Some(tree) = self.store.load_template(name)? else {
            warn!(template = name, "template not found");
            return Err(SessionError::UnknownTemplate {
                name: name.trim().to_string(),
            });
        };
        self.factory.observe(&tree);
        self.replace_tree(tree);
        debug!(template = name, state_hash = self.tree.state_hash(), "template loaded");
        Ok(())
    }

    pub fn delete_template(&mut self, name: &str) -> Result<bool, SessionError> {
        let _span = tracing::debug_span!("splitcanvas.session.delete_template").entered();
        Ok(self.store.delete_template(name)?)
    }

    pub fn template_names(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.store.template_names()?)
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn commit(&mut self) -> bool {
        self.history.push(self.tree.clone())
    }

    fn replace_tree(&mut self, tree: LayoutNode) {
        self.tree = tree;
        self.selected = None;
        self.commit();
    }

    fn adopt_snapshot(&mut self, snapshot: &Arc<LayoutNode>) {
        self.tree = LayoutNode::clone(snapshot);
        self.selected = None;
    }

    fn drop_stale_selection(&mut self) {
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.tree.contains(id))
        {
            self.selected = None;
        }
    }
}
