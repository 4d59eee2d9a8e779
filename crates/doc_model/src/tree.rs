//! Document tree storage and structural operations
//!
//! Nodes live in a flat arena keyed by [`NodeId`]. Each entry is an
//! `Arc<Node>`, so cloning a [`DocumentTree`] is a cheap snapshot that shares
//! every node with the original. Writes go through [`DocumentTree::get_writable`],
//! which clones a node the first time it is touched after a snapshot was taken.
//! A snapshot is therefore never changed by edits made to another copy.

use crate::{DocModelError, FootnoteId, Node, NodeId, NodeKind, NodeType, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The complete document tree structure
#[derive(Debug, Clone)]
pub struct DocumentTree {
    root: NodeId,
    nodes: HashMap<NodeId, Arc<Node>>,
    /// Per-document footnote counter, see [`DocumentTree::bump_footnote_counter`]
    footnote_counter: u64,
    /// Every footnote id handed out or loaded for this document
    issued_footnote_ids: HashSet<FootnoteId>,
}

impl DocumentTree {
    /// Create a tree holding only a root node
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Root);
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, Arc::new(root));
        Self {
            root: root_id,
            nodes,
            footnote_counter: 0,
            issued_footnote_ids: HashSet::new(),
        }
    }

    /// Create a document tree with a single empty paragraph
    pub fn with_empty_paragraph() -> Self {
        let mut tree = Self::new();
        let root = tree.root;
        tree.push_child_unchecked(root, Node::new(NodeKind::paragraph()));
        tree
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(|n| n.as_ref())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(|n| n.node_type())
    }

    /// Children of a node; empty for leaves and unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent())
    }

    /// Mutable access to a node, cloning it first if a snapshot shares it
    pub fn get_writable(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .map(Arc::make_mut)
            .ok_or(DocModelError::NodeNotFound(id))
    }

    /// Whether this tree and `other` still share the same allocation for `id`
    pub fn shares_node(&self, other: &DocumentTree, id: NodeId) -> bool {
        match (self.nodes.get(&id), other.nodes.get(&id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    // =========================================================================
    // Footnote counter
    // =========================================================================

    pub fn footnote_counter(&self) -> u64 {
        self.footnote_counter
    }

    pub fn set_footnote_counter(&mut self, value: u64) {
        self.footnote_counter = value;
    }

    /// Increment the counter and return the new value
    pub fn bump_footnote_counter(&mut self) -> u64 {
        self.footnote_counter += 1;
        self.footnote_counter
    }

    /// Record a footnote id as used. Returns false if it was already recorded.
    pub fn mark_footnote_id_issued(&mut self, id: FootnoteId) -> bool {
        self.issued_footnote_ids.insert(id)
    }

    pub fn is_footnote_id_issued(&self, id: &FootnoteId) -> bool {
        self.issued_footnote_ids.contains(id)
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    pub fn append_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, node)
    }

    /// Insert a detached node as the `index`-th child of `parent`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, node: Node) -> Result<NodeId> {
        let parent_node = self
            .get(parent)
            .ok_or(DocModelError::NodeNotFound(parent))?;
        if !parent_node.can_have_children() {
            return Err(DocModelError::NotAnElement {
                node_id: parent,
                node_type: parent_node.node_type(),
            });
        }
        if index > parent_node.children().len() {
            return Err(DocModelError::InvalidPosition {
                node_id: parent,
                offset: index,
            });
        }
        if self.contains(node.id()) {
            return Err(DocModelError::TreeStructureError(format!(
                "node {} is already part of the tree",
                node.id()
            )));
        }

        let mut node = node;
        let id = node.id();
        node.set_parent(Some(parent));
        self.nodes.insert(id, Arc::new(node));
        self.get_writable(parent)?.children_mut().insert(index, id);
        Ok(id)
    }

    pub fn insert_after(&mut self, sibling: NodeId, node: Node) -> Result<NodeId> {
        let (parent, index) = self.slot_of(sibling)?;
        self.insert_child(parent, index + 1, node)
    }

    pub fn insert_before(&mut self, sibling: NodeId, node: Node) -> Result<NodeId> {
        let (parent, index) = self.slot_of(sibling)?;
        self.insert_child(parent, index, node)
    }

    /// Detach a node and drop its whole subtree from the arena.
    ///
    /// Returns the removed node itself.
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        if id == self.root {
            return Err(DocModelError::InvalidOperation(
                "cannot remove the root node".to_string(),
            ));
        }
        if !self.contains(id) {
            return Err(DocModelError::NodeNotFound(id));
        }

        if let Some(parent) = self.parent(id) {
            if self.contains(parent) {
                self.get_writable(parent)?.children_mut().retain(|c| *c != id);
            }
        }

        let subtree: Vec<NodeId> = self.pre_order(id).collect();
        let mut removed = None;
        for node_id in subtree {
            if let Some(node) = self.nodes.remove(&node_id) {
                if node_id == id {
                    removed = Some(node);
                }
            }
        }

        let node = removed.ok_or(DocModelError::NodeNotFound(id))?;
        let mut node = Arc::try_unwrap(node).unwrap_or_else(|shared| (*shared).clone());
        node.set_parent(None);
        Ok(node)
    }

    /// Swap the payload of a node while keeping its id and position
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        let node = self.get(id).ok_or(DocModelError::NodeNotFound(id))?;
        if id == self.root && kind.node_type() != NodeType::Root {
            return Err(DocModelError::InvalidOperation(
                "the root node can only hold a root payload".to_string(),
            ));
        }
        if !node.children().is_empty() && !kind.node_type().is_element() {
            return Err(DocModelError::NotAnElement {
                node_id: id,
                node_type: kind.node_type(),
            });
        }
        self.get_writable(id)?.kind = kind;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True when the parent chain of `id` reaches the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        // Bounded by the arena size so a corrupted chain cannot loop forever.
        for _ in 0..self.nodes.len() {
            if current == self.root {
                return self.contains(current);
            }
            let Some(node) = self.get(current) else {
                return false;
            };
            let Some(parent) = node.parent() else {
                return false;
            };
            if !self.children(parent).contains(&current) {
                return false;
            }
            current = parent;
        }
        false
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Child indices from the root down to `id`; `None` when detached
    pub fn path_to(&self, id: NodeId) -> Option<Vec<usize>> {
        if !self.is_attached(id) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    /// Depth-first, left-to-right traversal starting at (and including) `from`
    pub fn pre_order(&self, from: NodeId) -> PreOrder<'_> {
        let stack = if self.contains(from) { vec![from] } else { Vec::new() };
        PreOrder { tree: self, stack }
    }

    /// Leaf nodes below `from` in document order
    pub fn leaves(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.pre_order(from)
            .filter(move |id| self.get(*id).map(|n| !n.can_have_children()).unwrap_or(false))
    }

    /// Plain text of a subtree. Footnote references contribute nothing.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node_id in self.pre_order(id) {
            match self.kind(node_id) {
                Some(NodeKind::Text(run)) | Some(NodeKind::Highlight(run)) => {
                    text.push_str(&run.text)
                }
                Some(NodeKind::LineBreak) => text.push('\n'),
                _ => {}
            }
        }
        text
    }

    fn slot_of(&self, id: NodeId) -> Result<(NodeId, usize)> {
        let parent = self.parent(id).ok_or_else(|| {
            DocModelError::TreeStructureError(format!("node {} has no parent", id))
        })?;
        let index = self
            .index_in_parent(id)
            .ok_or(DocModelError::NodeNotFound(id))?;
        Ok((parent, index))
    }

    fn push_child_unchecked(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = node.id();
        node.set_parent(Some(parent));
        self.nodes.insert(id, Arc::new(node));
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            Arc::make_mut(parent_node).children_mut().push(id);
        }
        id
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over node ids
pub struct PreOrder<'a> {
    tree: &'a DocumentTree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextRun;

    fn paragraph_with(tree: &mut DocumentTree, texts: &[&str]) -> (NodeId, Vec<NodeId>) {
        let root = tree.root_id();
        let para = tree.append_child(root, Node::new(NodeKind::paragraph())).unwrap();
        let runs = texts
            .iter()
            .map(|t| tree.append_child(para, Node::new(NodeKind::text(*t))).unwrap())
            .collect();
        (para, runs)
    }

    #[test]
    fn test_new_tree() {
        let tree = DocumentTree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert_eq!(tree.footnote_counter(), 0);
        assert_eq!(tree.node_type(tree.root_id()), Some(NodeType::Root));

        let tree = DocumentTree::with_empty_paragraph();
        assert_eq!(tree.children(tree.root_id()).len(), 1);
    }

    #[test]
    fn test_insert_and_order() {
        let mut tree = DocumentTree::new();
        let (para, runs) = paragraph_with(&mut tree, &["a", "c"]);

        let b = tree.insert_after(runs[0], Node::new(NodeKind::text("b"))).unwrap();
        let start = tree.insert_before(runs[0], Node::new(NodeKind::text(">"))).unwrap();

        assert_eq!(tree.children(para), &[start, runs[0], b, runs[1]]);
        assert_eq!(tree.text_content(tree.root_id()), ">abc");
        assert_eq!(tree.index_in_parent(b), Some(2));
        assert_eq!(tree.parent(b), Some(para));
    }

    #[test]
    fn test_insert_into_leaf_fails() {
        let mut tree = DocumentTree::new();
        let (_, runs) = paragraph_with(&mut tree, &["a"]);
        let result = tree.append_child(runs[0], Node::new(NodeKind::text("b")));
        assert!(matches!(result, Err(DocModelError::NotAnElement { .. })));
    }

    #[test]
    fn test_insert_out_of_range_fails() {
        let mut tree = DocumentTree::new();
        let (para, _) = paragraph_with(&mut tree, &["a"]);
        let result = tree.insert_child(para, 5, Node::new(NodeKind::text("b")));
        assert!(matches!(result, Err(DocModelError::InvalidPosition { .. })));
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = DocumentTree::new();
        let (para, runs) = paragraph_with(&mut tree, &["a", "b"]);
        assert_eq!(tree.len(), 4);

        let removed = tree.remove(para).unwrap();
        assert_eq!(removed.id(), para);
        assert!(removed.parent().is_none());
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains(runs[0]));
        assert!(!tree.is_attached(para));
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        assert!(tree.remove(root).is_err());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut tree = DocumentTree::new();
        let (para, runs) = paragraph_with(&mut tree, &["a", "b"]);

        tree.replace(runs[1], NodeKind::Highlight(TextRun::new("b"))).unwrap();
        assert_eq!(tree.children(para), runs.as_slice());
        assert_eq!(tree.node_type(runs[1]), Some(NodeType::Highlight));

        // An element with children cannot become a leaf
        assert!(tree.replace(para, NodeKind::text("x")).is_err());
    }

    #[test]
    fn test_is_attached() {
        let mut tree = DocumentTree::new();
        let (_, runs) = paragraph_with(&mut tree, &["a"]);
        assert!(tree.is_attached(runs[0]));
        assert!(tree.is_attached(tree.root_id()));
        assert!(!tree.is_attached(NodeId::new()));

        tree.remove(runs[0]).unwrap();
        assert!(!tree.is_attached(runs[0]));
    }

    #[test]
    fn test_pre_order_document_order() {
        let mut tree = DocumentTree::new();
        let (p1, r1) = paragraph_with(&mut tree, &["a", "b"]);
        let (p2, r2) = paragraph_with(&mut tree, &["c"]);

        let order: Vec<_> = tree.pre_order(tree.root_id()).collect();
        assert_eq!(order, vec![tree.root_id(), p1, r1[0], r1[1], p2, r2[0]]);

        let leaves: Vec<_> = tree.leaves(tree.root_id()).collect();
        assert_eq!(leaves, vec![r1[0], r1[1], r2[0]]);
        assert_eq!(tree.path_to(r2[0]), Some(vec![1, 0]));
    }

    #[test]
    fn test_snapshot_is_not_mutated() {
        let mut tree = DocumentTree::new();
        let (_, runs) = paragraph_with(&mut tree, &["before"]);

        let snapshot = tree.clone();
        assert!(tree.shares_node(&snapshot, runs[0]));

        tree.get_writable(runs[0]).unwrap().kind = NodeKind::text("after");

        assert!(!tree.shares_node(&snapshot, runs[0]));
        assert_eq!(snapshot.get(runs[0]).unwrap().text_content(), Some("before"));
        assert_eq!(tree.get(runs[0]).unwrap().text_content(), Some("after"));
    }

    #[test]
    fn test_footnote_counter() {
        let mut tree = DocumentTree::new();
        assert_eq!(tree.bump_footnote_counter(), 1);
        assert_eq!(tree.bump_footnote_counter(), 2);
        tree.set_footnote_counter(0);
        assert_eq!(tree.footnote_counter(), 0);

        let id = FootnoteId::from_string("footnote-1-1");
        assert!(tree.mark_footnote_id_issued(id.clone()));
        assert!(!tree.mark_footnote_id_issued(id.clone()));
        assert!(tree.is_footnote_id_issued(&id));
    }
}
