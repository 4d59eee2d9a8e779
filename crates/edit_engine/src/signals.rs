//! Editor signals and their delivery
//!
//! Commands never call into UI code. They queue an [`EditorSignal`] on the
//! running transaction, and the engine hands queued signals to every
//! subscriber once the transaction has committed. Delivery is fire and
//! forget: a subscriber whose receiver was dropped is pruned on the next
//! publish.

use doc_model::{DocumentTree, FootnoteId, FootnoteRef, NodeId};
use serde_json::Value;
use tokio::sync::mpsc;

/// Screen-space box of a rendered footnote marker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Where a popup editor for a footnote should be placed
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub node_id: NodeId,
    /// Geometry, when the host knows it
    pub rect: Option<AnchorRect>,
}

/// Host hook that locates the rendered element of a node.
pub trait AnchorResolver: Send + Sync {
    fn resolve(&self, tree: &DocumentTree, node_id: NodeId) -> Option<Anchor>;
}

/// Resolves any attached node to an anchor without geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAnchors;

impl AnchorResolver for NodeAnchors {
    fn resolve(&self, tree: &DocumentTree, node_id: NodeId) -> Option<Anchor> {
        tree.is_attached(node_id).then_some(Anchor {
            node_id,
            rect: None,
        })
    }
}

/// Never finds an anchor. Useful for hosts without a rendered view.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnchors;

impl AnchorResolver for NoAnchors {
    fn resolve(&self, _tree: &DocumentTree, _node_id: NodeId) -> Option<Anchor> {
        None
    }
}

/// State of a footnote reference at the moment a signal was raised
#[derive(Debug, Clone, PartialEq)]
pub struct FootnoteSnapshot {
    pub node: NodeId,
    pub footnote_id: FootnoteId,
    pub number: u32,
    pub content: String,
    pub json: Option<Value>,
}

impl FootnoteSnapshot {
    pub fn of(node: NodeId, footnote: &FootnoteRef) -> Self {
        Self {
            node,
            footnote_id: footnote.id.clone(),
            number: footnote.number,
            content: footnote.content.clone(),
            json: footnote.json.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorSignal {
    /// A footnote was just inserted and wants its body editor opened
    OpenFootnoteModal {
        footnote: FootnoteSnapshot,
        anchor: Option<Anchor>,
    },
    /// A rendered marker was clicked: open the body for editing
    FootnoteClick {
        footnote: FootnoteSnapshot,
        anchor: Option<Anchor>,
    },
    /// A rendered marker was pressed or hovered: show the body read-only
    FootnoteMouseEnter {
        footnote: FootnoteSnapshot,
        anchor: Option<Anchor>,
    },
    /// A footnote left the document
    FootnoteRemoved { footnote_id: FootnoteId, node: NodeId },
    /// A footnote body was written
    FootnoteSaved { footnote_id: FootnoteId, node: NodeId },
}

impl EditorSignal {
    pub fn name(&self) -> &'static str {
        match self {
            EditorSignal::OpenFootnoteModal { .. } => "openFootnoteModal",
            EditorSignal::FootnoteClick { .. } => "footnoteClick",
            EditorSignal::FootnoteMouseEnter { .. } => "footnoteMouseEnter",
            EditorSignal::FootnoteRemoved { .. } => "footnoteRemoved",
            EditorSignal::FootnoteSaved { .. } => "footnoteSaved",
        }
    }

    pub fn footnote_id(&self) -> &FootnoteId {
        match self {
            EditorSignal::OpenFootnoteModal { footnote, .. }
            | EditorSignal::FootnoteClick { footnote, .. }
            | EditorSignal::FootnoteMouseEnter { footnote, .. } => &footnote.footnote_id,
            EditorSignal::FootnoteRemoved { footnote_id, .. }
            | EditorSignal::FootnoteSaved { footnote_id, .. } => footnote_id,
        }
    }

    /// Slot for a placement anchor, on signals that open a surface
    pub(crate) fn anchor_slot(&mut self) -> Option<(NodeId, &mut Option<Anchor>)> {
        match self {
            EditorSignal::OpenFootnoteModal { footnote, anchor }
            | EditorSignal::FootnoteClick { footnote, anchor }
            | EditorSignal::FootnoteMouseEnter { footnote, anchor } => Some((footnote.node, anchor)),
            EditorSignal::FootnoteRemoved { .. } | EditorSignal::FootnoteSaved { .. } => None,
        }
    }
}

pub type SignalReceiver = mpsc::UnboundedReceiver<EditorSignal>;

/// Fan-out of editor signals to any number of subscribers
#[derive(Debug, Default)]
pub struct SignalBus {
    subscribers: Vec<mpsc::UnboundedSender<EditorSignal>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> SignalReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver a signal to every live subscriber
    pub fn publish(&mut self, signal: EditorSignal) {
        tracing::trace!(signal = signal.name(), footnote = %signal.footnote_id(), "publishing signal");
        self.subscribers
            .retain(|subscriber| subscriber.send(signal.clone()).is_ok());
    }
}
