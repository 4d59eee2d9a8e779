//! Command execution engine

use crate::{
    AnchorResolver, Command, CommandOutcome, EditorConfig, EditorSignal, FootnoteSnapshot,
    NodeAnchors, Result, SignalBus, SignalReceiver, Transaction,
};
use doc_model::{DocumentTree, NodeId, NodeKind, Selection};

/// The main editing engine that owns the committed document state
pub struct EditingEngine {
    /// Committed document tree
    tree: DocumentTree,
    /// Committed selection; `None` when the editor is not focused
    selection: Option<Selection>,
    config: EditorConfig,
    signals: SignalBus,
    anchors: Box<dyn AnchorResolver>,
}

impl EditingEngine {
    /// Create a new editing engine with an empty document
    pub fn new() -> Self {
        Self::with_tree(DocumentTree::with_empty_paragraph(), EditorConfig::default())
    }

    /// Create an editing engine with a specific document tree.
    ///
    /// The caret starts at the beginning of the first top-level block, if any.
    pub fn with_tree(tree: DocumentTree, config: EditorConfig) -> Self {
        let selection = tree
            .children(tree.root_id())
            .first()
            .map(|block| Selection::at_start_of(*block));

        Self {
            tree,
            selection,
            config,
            signals: SignalBus::new(),
            anchors: Box::new(NodeAnchors),
        }
    }

    /// Get the committed document tree
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the host hook used to place popup editors
    pub fn set_anchor_resolver(&mut self, resolver: impl AnchorResolver + 'static) {
        self.anchors = Box::new(resolver);
    }

    /// Receive every signal published after this call
    pub fn subscribe(&mut self) -> SignalReceiver {
        self.signals.subscribe()
    }

    /// Run a read-only closure against a consistent snapshot
    pub fn read<T>(&self, f: impl FnOnce(&DocumentTree) -> T) -> T {
        f(&self.tree)
    }

    /// Run a closure inside a transaction.
    ///
    /// On `Ok` the working tree, selection and queued signals are committed
    /// together and the signals are delivered. On `Err` everything the
    /// closure did is discarded.
    pub fn update<T>(&mut self, f: impl FnOnce(&mut Transaction) -> Result<T>) -> Result<T> {
        let mut tx = Transaction::begin(&self.tree, self.selection, &self.config);
        let value = f(&mut tx)?;

        let (tree, selection, signals) = tx.finish();
        self.tree = tree;
        self.selection = selection;
        for signal in signals {
            self.deliver(signal);
        }
        Ok(value)
    }

    /// Execute a single command in its own transaction
    pub fn execute(&mut self, command: &dyn Command) -> Result<CommandOutcome> {
        self.config.ensure_registered(command.required_nodes())?;
        self.update(|tx| tx.execute(command))
    }

    /// A rendered footnote marker was clicked
    pub fn footnote_clicked(&mut self, node_id: NodeId) -> bool {
        self.interaction(node_id, |footnote| EditorSignal::FootnoteClick {
            footnote,
            anchor: None,
        })
    }

    /// A rendered footnote marker received pointer-down
    pub fn footnote_pointer_down(&mut self, node_id: NodeId) -> bool {
        self.interaction(node_id, |footnote| EditorSignal::FootnoteMouseEnter {
            footnote,
            anchor: None,
        })
    }

    fn interaction(
        &mut self,
        node_id: NodeId,
        make: impl FnOnce(FootnoteSnapshot) -> EditorSignal,
    ) -> bool {
        let Some(NodeKind::Footnote(footnote)) = self.tree.kind(node_id) else {
            tracing::debug!(%node_id, "interaction on a node that is not a footnote");
            return false;
        };
        let signal = make(FootnoteSnapshot::of(node_id, footnote));
        self.deliver(signal);
        true
    }

    /// Fill in the placement anchor, then publish
    fn deliver(&mut self, mut signal: EditorSignal) {
        let footnote_id = signal.footnote_id().clone();
        if let Some((node_id, anchor)) = signal.anchor_slot() {
            if anchor.is_none() {
                *anchor = self.anchors.resolve(&self.tree, node_id);
                if anchor.is_none() {
                    tracing::warn!(footnote = %footnote_id, %node_id, "footnote anchor element not found");
                }
            }
        }
        self.signals.publish(signal);
    }
}

impl Default for EditingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingEngine")
            .field("tree", &self.tree)
            .field("selection", &self.selection)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
