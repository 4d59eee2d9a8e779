//! Footnote commands
//!
//! Insert, save, remove and renumber footnote references. Every command runs
//! inside a transaction; removal renumbers the survivors before the
//! transaction commits, so no reader ever sees stale numbers after a removal.

use crate::caret::{insert_inline_at, position_after};
use crate::{Command, CommandOutcome, EditorSignal, FootnoteSnapshot, Result, SkipReason, Transaction};
use doc_model::{
    create_footnote_reference, find_footnote, non_null_body, renumber, DocumentTree, FootnoteId,
    Node, NodeId, NodeKind, NodeType, Position, Selection,
};
use serde_json::Value;

const FOOTNOTE_NODES: &[NodeType] = &[NodeType::Footnote];

/// Insert a new footnote reference at the caret
#[derive(Debug, Clone, Default)]
pub struct InsertFootnote {
    /// Fixed clock for the id timestamp; wall clock when `None`
    timestamp_millis: Option<i64>,
}

impl InsertFootnote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp ids with a fixed time instead of the wall clock
    pub fn at_time(timestamp_millis: i64) -> Self {
        Self {
            timestamp_millis: Some(timestamp_millis),
        }
    }

    /// Bump the counter until it yields an id this document has never used
    fn next_id(&self, tree: &mut DocumentTree) -> (FootnoteId, u64) {
        loop {
            let counter = tree.bump_footnote_counter();
            let id = match self.timestamp_millis {
                Some(millis) => FootnoteId::generate(millis, counter),
                None => FootnoteId::now(counter),
            };
            if tree.mark_footnote_id_issued(id.clone()) {
                return (id, counter);
            }
        }
    }
}

impl Command for InsertFootnote {
    fn apply(&self, tx: &mut Transaction) -> Result<CommandOutcome> {
        let Some(selection) = tx.selection() else {
            return Ok(CommandOutcome::Skipped(SkipReason::NoSelection));
        };
        if !selection.is_valid_in(tx.tree()) {
            return Ok(CommandOutcome::Skipped(SkipReason::InvalidSelection));
        }

        // A range selection keeps its text; the reference goes at its end.
        let (_, end) = selection.ordered(tx.tree());
        let tree = tx.tree_mut();
        let (id, counter) = self.next_id(tree);
        let footnote = create_footnote_reference(id, counter as u32, "", None);

        let node_id = insert_inline_at(tree, end, Node::new(NodeKind::Footnote(footnote.clone())))?;
        let caret = position_after(tree, node_id).unwrap_or(end);

        tracing::debug!(footnote = %footnote.id, number = footnote.number, "inserted footnote");
        tx.set_selection(Some(Selection::collapsed(caret)));
        tx.emit(EditorSignal::OpenFootnoteModal {
            footnote: FootnoteSnapshot::of(node_id, &footnote),
            anchor: None,
        });
        Ok(CommandOutcome::Applied)
    }

    fn display_name(&self) -> &str {
        "Insert Footnote"
    }

    fn required_nodes(&self) -> &'static [NodeType] {
        FOOTNOTE_NODES
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// How a command names the footnote it works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FootnoteTarget {
    Node(NodeId),
    Id(FootnoteId),
}

impl FootnoteTarget {
    fn resolve(&self, tree: &DocumentTree) -> std::result::Result<NodeId, SkipReason> {
        match self {
            FootnoteTarget::Node(node_id) => Ok(*node_id),
            FootnoteTarget::Id(id) => {
                find_footnote(tree, id).ok_or_else(|| SkipReason::FootnoteNotFound(id.clone()))
            }
        }
    }
}

/// Remove a footnote reference and renumber the rest
#[derive(Debug, Clone)]
pub struct RemoveFootnote {
    target: FootnoteTarget,
}

impl RemoveFootnote {
    pub fn node(node_id: NodeId) -> Self {
        Self {
            target: FootnoteTarget::Node(node_id),
        }
    }

    pub fn by_id(id: FootnoteId) -> Self {
        Self {
            target: FootnoteTarget::Id(id),
        }
    }
}

impl Command for RemoveFootnote {
    fn apply(&self, tx: &mut Transaction) -> Result<CommandOutcome> {
        let node_id = match self.target.resolve(tx.tree()) {
            Ok(node_id) => node_id,
            Err(reason) => return Ok(CommandOutcome::Skipped(reason)),
        };
        if !tx.tree().is_attached(node_id) {
            return Ok(CommandOutcome::Skipped(SkipReason::Detached(node_id)));
        }
        let Some(NodeKind::Footnote(footnote)) = tx.tree().kind(node_id) else {
            return Ok(CommandOutcome::Skipped(SkipReason::NotAFootnote(node_id)));
        };
        let footnote_id = footnote.id.clone();

        let tree = tx.tree_mut();
        let slot = tree
            .parent(node_id)
            .zip(tree.index_in_parent(node_id))
            .map(|(parent, index)| Position::new(parent, index));
        tree.remove(node_id)?;
        let root = tree.root_id();
        renumber(tree, root);

        if let (Some(selection), Some(slot)) = (tx.selection(), slot) {
            // Slots after the removed child shift down by one
            let relocate = |p: Position| {
                if p.node_id == node_id {
                    slot
                } else if p.node_id == slot.node_id && p.offset > slot.offset {
                    Position::new(p.node_id, p.offset - 1)
                } else {
                    p
                }
            };
            tx.set_selection(Some(Selection::new(
                relocate(selection.anchor),
                relocate(selection.focus),
            )));
        }

        tracing::debug!(footnote = %footnote_id, "removed footnote");
        tx.emit(EditorSignal::FootnoteRemoved {
            footnote_id,
            node: node_id,
        });
        Ok(CommandOutcome::Applied)
    }

    fn display_name(&self) -> &str {
        "Remove Footnote"
    }

    fn required_nodes(&self) -> &'static [NodeType] {
        FOOTNOTE_NODES
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Write a new body into a footnote
#[derive(Debug, Clone)]
pub struct SaveFootnoteContent {
    footnote_id: FootnoteId,
    json: Option<Value>,
    content: Option<String>,
}

impl SaveFootnoteContent {
    pub fn new(footnote_id: FootnoteId, json: Option<Value>) -> Self {
        Self {
            footnote_id,
            json: non_null_body(json),
            content: None,
        }
    }

    /// Also replace the legacy plain-text body
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

impl Command for SaveFootnoteContent {
    fn apply(&self, tx: &mut Transaction) -> Result<CommandOutcome> {
        let Some(node_id) = find_footnote(tx.tree(), &self.footnote_id) else {
            return Ok(CommandOutcome::Skipped(SkipReason::FootnoteNotFound(
                self.footnote_id.clone(),
            )));
        };

        let node = tx.tree_mut().get_writable(node_id)?;
        let Some(footnote) = node.kind.footnote_mut() else {
            return Ok(CommandOutcome::Skipped(SkipReason::NotAFootnote(node_id)));
        };
        footnote.json = self.json.clone();
        if let Some(content) = &self.content {
            footnote.content = content.clone();
        }

        tx.emit(EditorSignal::FootnoteSaved {
            footnote_id: self.footnote_id.clone(),
            node: node_id,
        });
        Ok(CommandOutcome::Applied)
    }

    fn display_name(&self) -> &str {
        "Save Footnote"
    }

    fn required_nodes(&self) -> &'static [NodeType] {
        FOOTNOTE_NODES
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Bring every footnote number back in line with document order
#[derive(Debug, Clone, Default)]
pub struct RenumberFootnotes;

impl Command for RenumberFootnotes {
    fn apply(&self, tx: &mut Transaction) -> Result<CommandOutcome> {
        let tree = tx.tree_mut();
        let root = tree.root_id();
        renumber(tree, root);
        Ok(CommandOutcome::Applied)
    }

    fn display_name(&self) -> &str {
        "Renumber Footnotes"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditingEngine, EditorConfig, EditError};
    use doc_model::{collect_footnotes, list_footnotes};
    use serde_json::json;

    fn create_test_engine(text: &str) -> (EditingEngine, NodeId, NodeId) {
        let mut tree = DocumentTree::with_empty_paragraph();
        let para = tree.children(tree.root_id())[0];
        let run = tree.append_child(para, Node::new(NodeKind::text(text))).unwrap();
        let mut engine = EditingEngine::with_tree(tree, EditorConfig::default());
        engine.set_selection(Some(Selection::collapsed(Position::new(run, 0))));
        (engine, para, run)
    }

    fn numbers(engine: &EditingEngine) -> Vec<u32> {
        engine.read(|tree| {
            collect_footnotes(tree, tree.root_id())
                .into_iter()
                .filter_map(|id| tree.kind(id)?.footnote().map(|f| f.number))
                .collect()
        })
    }

    fn insert_at(engine: &mut EditingEngine, run: NodeId, offset: usize) -> NodeId {
        engine.set_selection(Some(Selection::collapsed(Position::new(run, offset))));
        engine.execute(&InsertFootnote::at_time(1_000)).unwrap();
        let caret = engine.selection().unwrap().focus;
        engine.read(|tree| tree.children(caret.node_id)[caret.offset - 1])
    }

    #[test]
    fn test_insert_into_empty_document() {
        let mut engine = EditingEngine::new();
        let outcome = engine.execute(&InsertFootnote::new()).unwrap();
        assert!(outcome.applied());

        let footnotes = list_footnotes(engine.tree());
        assert_eq!(footnotes.len(), 1);
        assert!(footnotes[0].id.is_generated());
        assert_eq!(footnotes[0].number, 1);
        assert_eq!(engine.tree().footnote_counter(), 1);
    }

    #[test]
    fn test_insert_moves_caret_after_reference() {
        let (mut engine, para, run) = create_test_engine("HelloWorld");
        let footnote = insert_at(&mut engine, run, 5);

        let children = engine.tree().children(para).to_vec();
        assert_eq!(children[1], footnote);
        assert_eq!(engine.selection().unwrap().focus, Position::new(para, 2));
        assert_eq!(engine.tree().text_content(para), "HelloWorld");
    }

    #[test]
    fn test_insert_with_range_selection_keeps_text() {
        let (mut engine, para, run) = create_test_engine("HelloWorld");
        engine.set_selection(Some(Selection::new(Position::new(run, 7), Position::new(run, 2))));
        engine.execute(&InsertFootnote::at_time(5)).unwrap();

        let children = engine.tree().children(para).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(engine.tree().get(children[0]).unwrap().text_content(), Some("HelloWo"));
        assert_eq!(engine.tree().node_type(children[1]), Some(NodeType::Footnote));
        assert_eq!(engine.tree().text_content(para), "HelloWorld");
    }

    #[test]
    fn test_insert_without_selection_is_skipped() {
        let (mut engine, _, _) = create_test_engine("x");
        engine.set_selection(None);
        let outcome = engine.execute(&InsertFootnote::new()).unwrap();
        assert!(outcome.handled());
        assert!(!outcome.applied());
        assert_eq!(outcome.skip_reason(), Some(&SkipReason::NoSelection));
        assert_eq!(engine.tree().footnote_counter(), 0);
    }

    #[test]
    fn test_insert_never_reuses_ids() {
        let (mut engine, _, run) = create_test_engine("abc");
        let first = insert_at(&mut engine, run, 1);
        let first_id = engine.tree().kind(first).unwrap().footnote().unwrap().id.clone();
        engine.execute(&RemoveFootnote::node(first)).unwrap();
        assert_eq!(engine.tree().footnote_counter(), 0);

        // Same clock and counter value as the removed footnote
        let second = insert_at(&mut engine, run, 1);
        let second_id = engine.tree().kind(second).unwrap().footnote().unwrap().id.clone();
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn test_insert_requires_registered_node() {
        let tree = DocumentTree::with_empty_paragraph();
        let config = EditorConfig::with_nodes(&[NodeType::Paragraph, NodeType::Text]);
        let mut engine = EditingEngine::with_tree(tree, config);
        let result = engine.execute(&InsertFootnote::new());
        assert!(matches!(result, Err(EditError::NodeNotRegistered(NodeType::Footnote))));
    }

    fn insert_at_end(engine: &mut EditingEngine, para: NodeId) -> NodeId {
        let len = engine.tree().children(para).len();
        engine.set_selection(Some(Selection::collapsed(Position::new(para, len))));
        engine.execute(&InsertFootnote::new()).unwrap();
        engine.read(|tree| tree.children(para)[len])
    }

    #[test]
    fn test_remove_renumbers() {
        let (mut engine, para, _) = create_test_engine("abcdef");
        let a = insert_at_end(&mut engine, para);
        let b = insert_at_end(&mut engine, para);
        let _c = insert_at_end(&mut engine, para);
        assert_eq!(numbers(&engine), vec![1, 2, 3]);

        let outcome = engine.execute(&RemoveFootnote::node(b)).unwrap();
        assert!(outcome.applied());
        assert_eq!(numbers(&engine), vec![1, 2]);
        assert_eq!(engine.tree().footnote_counter(), 2);
        assert!(engine.tree().contains(a));
    }

    #[test]
    fn test_double_remove_is_noop() {
        let (mut engine, _, run) = create_test_engine("ab");
        let a = insert_at(&mut engine, run, 1);
        assert!(engine.execute(&RemoveFootnote::node(a)).unwrap().applied());

        let outcome = engine.execute(&RemoveFootnote::node(a)).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::Detached(a)));
    }

    #[test]
    fn test_remove_by_id_and_non_footnote() {
        let (mut engine, _, run) = create_test_engine("ab");
        let outcome = engine.execute(&RemoveFootnote::node(run)).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::NotAFootnote(run)));

        let missing = FootnoteId::from_string("nope");
        let outcome = engine.execute(&RemoveFootnote::by_id(missing.clone())).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::FootnoteNotFound(missing)));
    }

    #[test]
    fn test_remove_relocates_caret() {
        let (mut engine, para, run) = create_test_engine("ab");
        let a = insert_at(&mut engine, run, 1);
        engine.set_selection(Some(Selection::collapsed(Position::new(a, 0))));
        engine.execute(&RemoveFootnote::node(a)).unwrap();
        assert_eq!(engine.selection().unwrap().focus, Position::new(para, 1));
    }

    #[test]
    fn test_remove_shifts_caret_after_removed_slot() {
        let (mut engine, para, run) = create_test_engine("HelloWorld");
        let first = insert_at(&mut engine, run, 5);
        assert_eq!(engine.selection().unwrap().focus, Position::new(para, 2));

        engine.execute(&RemoveFootnote::node(first)).unwrap();
        assert_eq!(engine.selection().unwrap().focus, Position::new(para, 1));

        engine.execute(&InsertFootnote::at_time(2_000)).unwrap();
        let children = engine.tree().children(para).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(engine.tree().text_content(children[0]), "Hello");
        assert_eq!(engine.tree().node_type(children[1]), Some(NodeType::Footnote));
        assert_eq!(engine.tree().text_content(children[2]), "World");
    }

    #[test]
    fn test_save_content() {
        let (mut engine, _, run) = create_test_engine("ab");
        let a = insert_at(&mut engine, run, 1);
        let id = engine.tree().kind(a).unwrap().footnote().unwrap().id.clone();
        let body = json!({"root": {"type": "root", "children": []}});

        let snapshot = engine.tree().clone();
        let outcome = engine
            .execute(&SaveFootnoteContent::new(id, Some(body.clone())).with_content("plain"))
            .unwrap();
        assert!(outcome.applied());

        let footnote = engine.tree().kind(a).unwrap().footnote().unwrap().clone();
        assert_eq!(footnote.json, Some(body));
        assert_eq!(footnote.content, "plain");
        // The earlier snapshot still sees the empty body
        assert_eq!(snapshot.kind(a).unwrap().footnote().unwrap().json, None);
    }

    #[test]
    fn test_save_null_body_clears_it() {
        let (mut engine, _, run) = create_test_engine("ab");
        let a = insert_at(&mut engine, run, 1);
        let id = engine.tree().kind(a).unwrap().footnote().unwrap().id.clone();

        engine
            .execute(&SaveFootnoteContent::new(id.clone(), Some(json!({"root": {}}))))
            .unwrap();
        engine.execute(&SaveFootnoteContent::new(id, Some(Value::Null))).unwrap();

        let footnote = engine.tree().kind(a).unwrap().footnote().unwrap();
        assert_eq!(footnote.json, None);
        assert!(!footnote.has_body());
    }

    #[test]
    fn test_save_unknown_id_leaves_tree_unchanged() {
        let (mut engine, para, run) = create_test_engine("ab");
        insert_at(&mut engine, run, 1);
        let before = engine.tree().clone();

        let outcome = engine
            .execute(&SaveFootnoteContent::new(FootnoteId::from_string("ghost"), Some(json!({}))))
            .unwrap();
        assert!(!outcome.applied());
        for id in before.pre_order(before.root_id()) {
            assert!(engine.tree().shares_node(&before, id));
        }
        assert_eq!(engine.tree().len(), before.len());
        assert_eq!(engine.tree().text_content(para), "ab");
    }

    #[test]
    fn test_renumber_command() {
        let (mut engine, _, run) = create_test_engine("abc");
        let a = insert_at(&mut engine, run, 1);
        engine
            .update(|tx| {
                if let Some(f) = tx.tree_mut().get_writable(a)?.kind.footnote_mut() {
                    f.number = 42;
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(numbers(&engine), vec![42]);

        assert!(engine.execute(&RenumberFootnotes).unwrap().applied());
        assert_eq!(numbers(&engine), vec![1]);
    }

    #[test]
    fn test_insert_emits_open_signal_after_commit() {
        let (mut engine, _, run) = create_test_engine("ab");
        let mut rx = engine.subscribe();
        let footnote = insert_at(&mut engine, run, 1);

        match rx.try_recv().unwrap() {
            EditorSignal::OpenFootnoteModal { footnote: snap, anchor } => {
                assert_eq!(snap.node, footnote);
                assert_eq!(snap.number, 1);
                assert!(snap.json.is_none());
                assert_eq!(anchor.map(|a| a.node_id), Some(footnote));
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }
}
