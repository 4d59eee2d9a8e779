//! Selection model - caret and range selections over the tree
//!
//! A [`Position`] names a node and an offset. Inside a text or highlight run
//! the offset counts grapheme clusters; inside an element it is a child slot
//! index, so `Position::new(paragraph, 2)` sits between the second and third
//! child.

use crate::{DocumentTree, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub node_id: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node_id: NodeId, offset: usize) -> Self {
        Self { node_id, offset }
    }

    pub fn start_of(node_id: NodeId) -> Self {
        Self { node_id, offset: 0 }
    }

    /// Sort key in document order; `None` when the node is detached
    fn order_key(&self, tree: &DocumentTree) -> Option<(Vec<usize>, usize)> {
        let node = tree.get(self.node_id)?;
        let mut path = tree.path_to(self.node_id)?;
        if node.can_have_children() {
            path.push(self.offset);
            Some((path, 0))
        } else {
            Some((path, self.offset))
        }
    }

    /// Compare two positions in document order
    pub fn cmp_in(&self, other: &Position, tree: &DocumentTree) -> Option<Ordering> {
        Some(self.order_key(tree)?.cmp(&other.order_key(tree)?))
    }
}

/// A selection in the document
///
/// The anchor is where the selection started and the focus is where the
/// caret is. When anchor == focus the selection is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (caret only)
    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    pub fn at_start_of(node_id: NodeId) -> Self {
        Self::collapsed(Position::start_of(node_id))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// True when the focus precedes the anchor in document order
    pub fn is_backward(&self, tree: &DocumentTree) -> bool {
        matches!(self.anchor.cmp_in(&self.focus, tree), Some(Ordering::Greater))
    }

    /// (start, end) in document order
    pub fn ordered(&self, tree: &DocumentTree) -> (Position, Position) {
        if self.is_backward(tree) {
            (self.focus, self.anchor)
        } else {
            (self.anchor, self.focus)
        }
    }

    /// Both endpoints exist and are attached
    pub fn is_valid_in(&self, tree: &DocumentTree) -> bool {
        tree.is_attached(self.anchor.node_id) && tree.is_attached(self.focus.node_id)
    }

    /// Leaf nodes overlapped by the selection, in document order
    pub fn selected_nodes(&self, tree: &DocumentTree) -> Vec<NodeId> {
        let (start, end) = self.ordered(tree);
        let (Some(start_key), Some(end_key)) = (start.order_key(tree), end.order_key(tree)) else {
            return Vec::new();
        };

        tree.leaves(tree.root_id())
            .filter(|leaf| {
                let Some(node) = tree.get(*leaf) else {
                    return false;
                };
                let Some(path) = tree.path_to(*leaf) else {
                    return false;
                };
                let leaf_start = (path.clone(), 0);
                let leaf_end = (path, node.content_len());
                leaf_start < end_key && leaf_end > start_key
            })
            .collect()
    }

    /// Text covered by the selection
    pub fn selected_text(&self, tree: &DocumentTree) -> String {
        let (start, end) = self.ordered(tree);
        let mut text = String::new();
        for leaf in self.selected_nodes(tree) {
            match tree.kind(leaf) {
                Some(NodeKind::Text(run)) | Some(NodeKind::Highlight(run)) => {
                    let from = if leaf == start.node_id { start.offset } else { 0 };
                    let to = if leaf == end.node_id {
                        end.offset
                    } else {
                        run.grapheme_count()
                    };
                    text.push_str(&run.slice(from, to));
                }
                Some(NodeKind::LineBreak) => text.push('\n'),
                _ => {}
            }
        }
        text
    }
}
