//! Conversion between the document tree and portable records

use crate::{ImportResult, ImportWarning, PortableNode, Result, WarningKind};
use doc_model::{DocModelError, DocumentTree, Node, NodeId, NodeKind};
use serde_json::Value;

/// Export a node and its subtree
pub fn to_portable(tree: &DocumentTree, node_id: NodeId) -> Result<PortableNode> {
    let node = tree.get(node_id).ok_or(DocModelError::NodeNotFound(node_id))?;
    let children = node
        .children()
        .iter()
        .map(|child| to_portable(tree, *child))
        .collect::<Result<Vec<_>>>()?;
    Ok(PortableNode {
        kind: node.kind.clone(),
        attrs: if node.can_have_children() {
            node.attrs.clone()
        } else {
            Default::default()
        },
        children,
    })
}

/// Import a portable record into a fresh document.
///
/// A root record becomes the document root; any other record is placed
/// under a new root. Unreadable parts are skipped and reported.
pub fn from_portable(record: &Value) -> ImportResult {
    let parsed = PortableNode::parse(record);
    let mut warnings = parsed.warnings;
    let tree = match parsed.node {
        Some(node) => build_tree(&node, &mut warnings),
        None => DocumentTree::new(),
    };
    ImportResult { tree, warnings }
}

/// Build a document from an already-read portable tree
pub fn build_tree(node: &PortableNode, warnings: &mut Vec<ImportWarning>) -> DocumentTree {
    let mut tree = DocumentTree::new();
    let root = tree.root_id();

    if matches!(node.kind, NodeKind::Root) {
        if let Ok(root_node) = tree.get_writable(root) {
            root_node.attrs = node.attrs.clone();
        }
        for (i, child) in node.children.iter().enumerate() {
            insert_subtree(&mut tree, root, child, &format!("root.children[{i}]"), warnings);
        }
    } else {
        insert_subtree(&mut tree, root, node, "root", warnings);
    }

    register_footnotes(&mut tree, warnings);
    tree
}

fn insert_subtree(
    tree: &mut DocumentTree,
    parent: NodeId,
    node: &PortableNode,
    path: &str,
    warnings: &mut Vec<ImportWarning>,
) {
    if matches!(node.kind, NodeKind::Root) {
        push_warning(warnings, WarningKind::InvalidField, path, "nested root node skipped".into());
        return;
    }

    let id = match tree.append_child(parent, Node::with_attrs(node.kind.clone(), node.attrs.clone())) {
        Ok(id) => id,
        Err(e) => {
            push_warning(warnings, WarningKind::InvalidField, path, e.to_string());
            return;
        }
    };

    if !node.children.is_empty() && !node.node_type().is_element() {
        push_warning(
            warnings,
            WarningKind::InvalidField,
            path,
            format!("{} node cannot have children", node.node_type()),
        );
        return;
    }
    for (i, child) in node.children.iter().enumerate() {
        insert_subtree(tree, id, child, &format!("{path}.children[{i}]"), warnings);
    }
}

/// Seed the footnote counter and the set of used ids from the loaded references
fn register_footnotes(tree: &mut DocumentTree, warnings: &mut Vec<ImportWarning>) {
    let footnotes = doc_model::collect_footnotes(tree, tree.root_id());
    let ids: Vec<_> = footnotes
        .iter()
        .filter_map(|id| tree.kind(*id)?.footnote().map(|f| f.id.clone()))
        .collect();

    for id in ids {
        if !tree.mark_footnote_id_issued(id.clone()) {
            push_warning(
                warnings,
                WarningKind::InvalidField,
                "root",
                format!("duplicate footnote id '{id}'"),
            );
        }
    }
    tree.set_footnote_counter(footnotes.len() as u64);
}

fn push_warning(warnings: &mut Vec<ImportWarning>, kind: WarningKind, path: &str, message: String) {
    tracing::warn!(%kind, path, "{}", message);
    warnings.push(ImportWarning {
        kind,
        path: path.to_string(),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{
        create_footnote_reference, create_highlight, FootnoteId, NodeType, TextFormat,
    };
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_through_tree() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let para = tree.append_child(root, Node::new(NodeKind::paragraph())).unwrap();
        tree.append_child(para, Node::new(NodeKind::text("a "))).unwrap();
        tree.append_child(para, Node::new(create_highlight("b", TextFormat::BOLD, "x"))).unwrap();
        tree.append_child(
            para,
            Node::new(NodeKind::Footnote(create_footnote_reference(
                FootnoteId::from_string("footnote-1-1"),
                1,
                "",
                Some(json!({"root": {"type": "root", "children": []}})),
            ))),
        )
        .unwrap();

        let portable = to_portable(&tree, root).unwrap();
        let result = from_portable(&portable.to_value());
        assert!(!result.has_warnings());
        assert_eq!(to_portable(&result.tree, result.tree.root_id()).unwrap(), portable);
        assert_eq!(result.tree.footnote_counter(), 1);
        assert!(result
            .tree
            .is_footnote_id_issued(&FootnoteId::from_string("footnote-1-1")));
    }

    #[test]
    fn test_non_root_record_is_wrapped() {
        let result = from_portable(&json!({"type": "paragraph", "children": [{"type": "text", "text": "x"}]}));
        let tree = &result.tree;
        let para = tree.children(tree.root_id())[0];
        assert_eq!(tree.node_type(para), Some(NodeType::Paragraph));
        assert_eq!(tree.text_content(para), "x");
    }

    #[test]
    fn test_unreadable_record_gives_empty_tree() {
        let result = from_portable(&json!({"type": "gallery"}));
        assert!(result.tree.is_empty());
        assert_eq!(result.warnings_of_kind(WarningKind::UnknownNodeType).len(), 1);
    }

    #[test]
    fn test_duplicate_footnote_ids_warn() {
        let f = json!({"type": "footnote", "id": "same", "number": 1, "content": "", "json": null});
        let result = from_portable(&json!({
            "type": "root",
            "children": [{"type": "paragraph", "children": [f.clone(), f]}]
        }));
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.tree.footnote_counter(), 2);
    }

    #[test]
    fn test_leaf_with_children_is_reported() {
        let node = PortableNode {
            kind: NodeKind::text("t"),
            attrs: Default::default(),
            children: vec![PortableNode::leaf(NodeKind::LineBreak)],
        };
        let mut warnings = Vec::new();
        let tree = build_tree(&node, &mut warnings);
        assert_eq!(tree.len(), 2);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let tree = DocumentTree::new();
        assert!(to_portable(&tree, NodeId::new()).is_err());
    }

    fn arb_json() -> impl Strategy<Value = Option<Value>> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z ]{0,12}".prop_map(Value::String),
        ];
        let value = leaf.prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        });
        prop::option::of(value)
    }

    proptest! {
        #[test]
        fn test_footnote_round_trip(
            id in "[a-z0-9-]{1,24}",
            number in 0u32..10_000,
            content in ".{0,40}",
            json in arb_json(),
        ) {
            let had_body = json.as_ref().is_some_and(|v| !v.is_null());
            let footnote = create_footnote_reference(FootnoteId::from_string(id), number, content, json);
            let node = PortableNode::leaf(NodeKind::Footnote(footnote));

            let parsed = PortableNode::parse(&node.to_value());
            prop_assert!(parsed.warnings.is_empty());
            let body = parsed.node.as_ref().and_then(|n| n.kind.footnote()).map(|f| f.json.is_some());
            prop_assert_eq!(body, Some(had_body));
            prop_assert_eq!(parsed.node, Some(node));
        }
    }
}
