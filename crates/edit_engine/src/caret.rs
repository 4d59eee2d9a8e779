//! Insertion of inline nodes at a caret position

use crate::Result;
use doc_model::{
    DocModelError, DocumentTree, ListItemAttrs, Node, NodeId, NodeKind, NodeType, Position,
};

/// Same kind of run with different text; other payloads are cloned as-is
pub(crate) fn with_run_text(kind: &NodeKind, text: String) -> NodeKind {
    match kind {
        NodeKind::Text(run) => NodeKind::Text(run.inherit(text)),
        NodeKind::Highlight(run) => NodeKind::Highlight(run.inherit(text)),
        other => other.clone(),
    }
}

/// Insert an inline leaf at `point`.
///
/// A caret strictly inside a run splits the run in two around the new node.
/// An element caret inserts at that child slot. Inline nodes cannot sit
/// directly under the root or a list: the root gets a fresh paragraph and a
/// list caret moves into the nearest list item.
pub(crate) fn insert_inline_at(tree: &mut DocumentTree, point: Position, node: Node) -> Result<NodeId> {
    let target = tree
        .get(point.node_id)
        .ok_or(DocModelError::NodeNotFound(point.node_id))?;
    let kind = target.kind.clone();
    let is_element = target.can_have_children();
    let child_count = target.children().len();

    if let Some(run) = kind.text_run() {
        let len = run.grapheme_count();
        if point.offset == 0 {
            return Ok(tree.insert_before(point.node_id, node)?);
        }
        if point.offset >= len {
            return Ok(tree.insert_after(point.node_id, node)?);
        }

        let (before, after) = run.split_at(point.offset);
        tree.replace(point.node_id, with_run_text(&kind, before))?;
        let inserted = tree.insert_after(point.node_id, node)?;
        tree.insert_after(inserted, Node::new(with_run_text(&kind, after)))?;
        return Ok(inserted);
    }

    if is_element {
        let index = point.offset.min(child_count);
        return match kind.node_type() {
            NodeType::Root => {
                let para = tree.insert_child(point.node_id, index, Node::new(NodeKind::paragraph()))?;
                Ok(tree.append_child(para, node)?)
            }
            NodeType::List => insert_into_list(tree, point.node_id, index, node),
            _ => Ok(tree.insert_child(point.node_id, index, node)?),
        };
    }

    if point.offset == 0 {
        Ok(tree.insert_before(point.node_id, node)?)
    } else {
        Ok(tree.insert_after(point.node_id, node)?)
    }
}

/// Start of the item at `index`, else the end of the last item, else a new item
fn insert_into_list(tree: &mut DocumentTree, list: NodeId, index: usize, node: Node) -> Result<NodeId> {
    let items = tree.children(list).to_vec();
    let is_item = |tree: &DocumentTree, id: NodeId| tree.node_type(id) == Some(NodeType::ListItem);

    if let Some(&item) = items.get(index).filter(|id| is_item(tree, **id)) {
        return Ok(tree.insert_child(item, 0, node)?);
    }
    if let Some(&last) = items.last().filter(|id| index >= items.len() && is_item(tree, **id)) {
        let len = tree.children(last).len();
        return Ok(tree.insert_child(last, len, node)?);
    }
    let item = tree.insert_child(list, index, Node::new(NodeKind::ListItem(ListItemAttrs::default())))?;
    Ok(tree.append_child(item, node)?)
}

/// Caret position just after `node_id` in its parent
pub(crate) fn position_after(tree: &DocumentTree, node_id: NodeId) -> Option<Position> {
    let parent = tree.parent(node_id)?;
    let index = tree.index_in_parent(node_id)?;
    Some(Position::new(parent, index + 1))
}
