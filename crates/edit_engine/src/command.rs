//! Command system for document editing

use crate::{EditorConfig, EditorSignal, Result};
use doc_model::{DocumentTree, FootnoteId, NodeId, NodeType, Selection};

/// Why a command left the document untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The editor has no selection
    NoSelection,
    /// The selection is collapsed or covers no text
    EmptySelection,
    /// A selection endpoint is not in the document
    InvalidSelection,
    FootnoteNotFound(FootnoteId),
    /// The target node is no longer part of the document
    Detached(NodeId),
    NotAFootnote(NodeId),
    /// No footnote body editor is open
    NoOpenEditor,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoSelection => write!(f, "no active selection"),
            SkipReason::EmptySelection => write!(f, "selection is empty"),
            SkipReason::InvalidSelection => write!(f, "selection is not inside the document"),
            SkipReason::FootnoteNotFound(id) => write!(f, "footnote {} not found", id),
            SkipReason::Detached(id) => write!(f, "node {} is not attached", id),
            SkipReason::NotAFootnote(id) => write!(f, "node {} is not a footnote", id),
            SkipReason::NoOpenEditor => write!(f, "no footnote editor is open"),
        }
    }
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Skipped(SkipReason),
}

impl CommandOutcome {
    /// The command was recognised and consumed. Always true; a skipped
    /// command is still handled and must not fall through to other handlers.
    pub fn handled(&self) -> bool {
        true
    }

    pub fn applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            CommandOutcome::Skipped(reason) => Some(reason),
            CommandOutcome::Applied => None,
        }
    }
}

/// Trait for all editing commands
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Apply this command inside a transaction
    fn apply(&self, tx: &mut Transaction) -> Result<CommandOutcome>;

    /// Get a display name for this command
    fn display_name(&self) -> &str;

    /// Node types this command creates or edits
    fn required_nodes(&self) -> &'static [NodeType] {
        &[]
    }

    /// Clone this command into a box
    fn clone_box(&self) -> Box<dyn Command>;
}

impl Clone for Box<dyn Command> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Working state of one `EditingEngine::update` call.
///
/// The tree is a copy-on-write snapshot of the committed document. Nothing
/// done here is visible outside until the update returns `Ok`.
#[derive(Debug)]
pub struct Transaction {
    tree: DocumentTree,
    selection: Option<Selection>,
    signals: Vec<EditorSignal>,
    config: EditorConfig,
}

impl Transaction {
    pub(crate) fn begin(tree: &DocumentTree, selection: Option<Selection>, config: &EditorConfig) -> Self {
        Self {
            tree: tree.clone(),
            selection,
            signals: Vec::new(),
            config: config.clone(),
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Queue a signal for delivery after commit
    pub fn emit(&mut self, signal: EditorSignal) {
        self.signals.push(signal);
    }

    pub fn pending_signals(&self) -> &[EditorSignal] {
        &self.signals
    }

    /// Run a command as part of this transaction
    pub fn execute(&mut self, command: &dyn Command) -> Result<CommandOutcome> {
        self.config.ensure_registered(command.required_nodes())?;
        let outcome = command.apply(self)?;
        if let CommandOutcome::Skipped(reason) = &outcome {
            tracing::debug!(command = command.display_name(), %reason, "command skipped");
        }
        Ok(outcome)
    }

    pub(crate) fn finish(self) -> (DocumentTree, Option<Selection>, Vec<EditorSignal>) {
        (self.tree, self.selection, self.signals)
    }
}
