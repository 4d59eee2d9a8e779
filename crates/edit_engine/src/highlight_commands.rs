//! Highlight toggling

use crate::{Command, CommandOutcome, EditingEngine, Result, SkipReason, Transaction};
use doc_model::{DocumentTree, Node, NodeId, NodeKind, NodeType, Position, Selection};

const HIGHLIGHT_NODES: &[NodeType] = &[NodeType::Text, NodeType::Highlight];

/// Turn the selected text into a highlight, or clear highlights in the selection
#[derive(Debug, Clone, Default)]
pub struct ToggleHighlight;

impl Command for ToggleHighlight {
    fn apply(&self, tx: &mut Transaction) -> Result<CommandOutcome> {
        let Some(selection) = tx.selection() else {
            return Ok(CommandOutcome::Skipped(SkipReason::NoSelection));
        };
        if !selection.is_valid_in(tx.tree()) {
            return Ok(CommandOutcome::Skipped(SkipReason::InvalidSelection));
        }
        if selection.is_collapsed() || selection.selected_text(tx.tree()).is_empty() {
            return Ok(CommandOutcome::Skipped(SkipReason::EmptySelection));
        }

        let nodes = selection.selected_nodes(tx.tree());
        let (start, end) = selection.ordered(tx.tree());

        if nodes.iter().any(|id| tx.tree().node_type(*id) == Some(NodeType::Highlight)) {
            let tree = tx.tree_mut();
            for id in nodes {
                if let Some(NodeKind::Highlight(run)) = tree.kind(id).cloned() {
                    tree.replace(id, NodeKind::Text(run))?;
                }
            }
            return Ok(CommandOutcome::Applied);
        }

        let text_nodes: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|id| tx.tree().node_type(*id) == Some(NodeType::Text))
            .collect();

        if nodes.len() == 1 && text_nodes.len() == 1 {
            let highlight = highlight_within(tx.tree_mut(), text_nodes[0], start, end)?;
            if let Some((node_id, len)) = highlight {
                tx.set_selection(Some(Selection::new(
                    Position::new(node_id, 0),
                    Position::new(node_id, len),
                )));
            }
            return Ok(CommandOutcome::Applied);
        }

        let tree = tx.tree_mut();
        for id in text_nodes {
            if let Some(NodeKind::Text(run)) = tree.kind(id).cloned() {
                tree.replace(id, run.into_highlight())?;
            }
        }
        Ok(CommandOutcome::Applied)
    }

    fn display_name(&self) -> &str {
        "Toggle Highlight"
    }

    fn required_nodes(&self) -> &'static [NodeType] {
        HIGHLIGHT_NODES
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Highlight the selected part of one text node.
///
/// A fully selected node is converted in place and keeps its id. A partial
/// selection splits the node into before / highlight / after runs, dropping
/// empty pieces. Returns the new highlight node and its length when a split
/// happened.
fn highlight_within(
    tree: &mut DocumentTree,
    node_id: NodeId,
    start: Position,
    end: Position,
) -> Result<Option<(NodeId, usize)>> {
    let Some(NodeKind::Text(run)) = tree.kind(node_id).cloned() else {
        return Ok(None);
    };
    let len = run.grapheme_count();
    let from = if start.node_id == node_id { start.offset.min(len) } else { 0 };
    let to = if end.node_id == node_id { end.offset.min(len) } else { len };

    if from == 0 && to == len {
        tree.replace(node_id, run.into_highlight())?;
        return Ok(None);
    }

    let before = run.slice(0, from);
    let selected = run.slice(from, to);
    let after = run.slice(to, len);
    let selected_len = to - from;

    let mut pieces = Vec::new();
    if !before.is_empty() {
        pieces.push((NodeKind::Text(run.inherit(before)), false));
    }
    pieces.push((NodeKind::Highlight(run.inherit(selected)), true));
    if !after.is_empty() {
        pieces.push((NodeKind::Text(run.inherit(after)), false));
    }

    let mut pieces = pieces.into_iter();
    let mut highlight = None;
    if let Some((kind, is_highlight)) = pieces.next() {
        tree.replace(node_id, kind)?;
        if is_highlight {
            highlight = Some(node_id);
        }
    }
    let mut previous = node_id;
    for (kind, is_highlight) in pieces {
        previous = tree.insert_after(previous, Node::new(kind))?;
        if is_highlight {
            highlight = Some(previous);
        }
    }

    Ok(highlight.map(|id| (id, selected_len)))
}

/// Whether the selection touches a highlight, for toolbar state
pub fn is_highlight_active(tree: &DocumentTree, selection: &Selection) -> bool {
    if selection.is_collapsed() {
        return tree.node_type(selection.anchor.node_id) == Some(NodeType::Highlight);
    }
    selection
        .selected_nodes(tree)
        .into_iter()
        .any(|id| tree.node_type(id) == Some(NodeType::Highlight))
}

/// Highlight support bound to an editor
#[derive(Debug, Clone)]
pub struct HighlightFeature {
    background_color: String,
}

impl HighlightFeature {
    /// Fails when the editor does not register the highlight node type
    pub fn attach(engine: &EditingEngine) -> Result<Self> {
        engine.config().ensure_registered(HIGHLIGHT_NODES)?;
        Ok(Self {
            background_color: engine.config().highlight.background_color.clone(),
        })
    }

    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    pub fn toggle(&self, engine: &mut EditingEngine) -> Result<CommandOutcome> {
        engine.execute(&ToggleHighlight)
    }

    pub fn is_active(&self, engine: &EditingEngine) -> bool {
        match engine.selection() {
            Some(selection) => engine.read(|tree| is_highlight_active(tree, &selection)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditError, EditorConfig};
    use doc_model::{TextFormat, TextRun};

    fn engine_with_runs(runs: &[&str]) -> (EditingEngine, NodeId, Vec<NodeId>) {
        let mut tree = DocumentTree::with_empty_paragraph();
        let para = tree.children(tree.root_id())[0];
        let ids = runs
            .iter()
            .map(|text| {
                tree.append_child(
                    para,
                    Node::new(NodeKind::Text(TextRun::with_format(*text, TextFormat::ITALIC, "color: red"))),
                )
                .unwrap()
            })
            .collect();
        (EditingEngine::with_tree(tree, EditorConfig::default()), para, ids)
    }

    fn kinds(engine: &EditingEngine, para: NodeId) -> Vec<(NodeType, String)> {
        engine.read(|tree| {
            tree.children(para)
                .iter()
                .map(|id| {
                    let node = tree.get(*id).unwrap();
                    (node.node_type(), node.text_content().unwrap_or("").to_string())
                })
                .collect()
        })
    }

    fn select(engine: &mut EditingEngine, anchor: (NodeId, usize), focus: (NodeId, usize)) {
        engine.set_selection(Some(Selection::new(
            Position::new(anchor.0, anchor.1),
            Position::new(focus.0, focus.1),
        )));
    }

    #[test]
    fn test_whole_node_becomes_highlight() {
        let (mut engine, para, runs) = engine_with_runs(&["Hello"]);
        select(&mut engine, (runs[0], 0), (runs[0], 5));
        assert!(engine.execute(&ToggleHighlight).unwrap().applied());

        assert_eq!(kinds(&engine, para), vec![(NodeType::Highlight, "Hello".into())]);
        let run = engine.tree().kind(runs[0]).unwrap().text_run().unwrap().clone();
        assert_eq!(run.format, TextFormat::ITALIC);
        assert_eq!(run.style, "color: red");
    }

    #[test]
    fn test_partial_selection_splits() {
        let (mut engine, para, runs) = engine_with_runs(&["Hello World"]);
        select(&mut engine, (runs[0], 2), (runs[0], 7));
        engine.execute(&ToggleHighlight).unwrap();

        assert_eq!(
            kinds(&engine, para),
            vec![
                (NodeType::Text, "He".into()),
                (NodeType::Highlight, "llo W".into()),
                (NodeType::Text, "orld".into()),
            ]
        );
        let highlight = engine.tree().children(para)[1];
        assert_eq!(
            engine.selection(),
            Some(Selection::new(Position::new(highlight, 0), Position::new(highlight, 5)))
        );
        let run = engine.tree().kind(highlight).unwrap().text_run().unwrap();
        assert_eq!(run.format, TextFormat::ITALIC);
    }

    #[test]
    fn test_backward_partial_selection() {
        let (mut engine, para, runs) = engine_with_runs(&["Hello World"]);
        select(&mut engine, (runs[0], 11), (runs[0], 6));
        engine.execute(&ToggleHighlight).unwrap();

        assert_eq!(
            kinds(&engine, para),
            vec![(NodeType::Text, "Hello ".into()), (NodeType::Highlight, "World".into())]
        );
    }

    #[test]
    fn test_toggle_off_restores_text() {
        let (mut engine, para, runs) = engine_with_runs(&["Hello World"]);
        select(&mut engine, (runs[0], 0), (runs[0], 5));
        engine.execute(&ToggleHighlight).unwrap();
        assert!(HighlightFeature::attach(&engine).unwrap().is_active(&engine));

        // The selection now covers the highlight; toggling reverts it
        engine.execute(&ToggleHighlight).unwrap();
        assert_eq!(
            kinds(&engine, para),
            vec![(NodeType::Text, "Hello".into()), (NodeType::Text, " World".into())]
        );
        let run = engine.tree().kind(engine.tree().children(para)[0]).unwrap().text_run().unwrap();
        assert_eq!(run.style, "color: red");
        assert_eq!(run.format, TextFormat::ITALIC);
    }

    #[test]
    fn test_multiple_nodes_each_highlighted() {
        let (mut engine, para, runs) = engine_with_runs(&["one ", "two ", "three"]);
        select(&mut engine, (runs[0], 2), (runs[2], 2));
        engine.execute(&ToggleHighlight).unwrap();

        assert_eq!(
            kinds(&engine, para),
            vec![
                (NodeType::Highlight, "one ".into()),
                (NodeType::Highlight, "two ".into()),
                (NodeType::Highlight, "three".into()),
            ]
        );
    }

    #[test]
    fn test_mixed_selection_clears_highlights() {
        let (mut engine, para, runs) = engine_with_runs(&["one ", "two"]);
        engine
            .update(|tx| {
                tx.tree_mut().replace(runs[1], NodeKind::Highlight(TextRun::new("two")))?;
                Ok(())
            })
            .unwrap();
        select(&mut engine, (runs[0], 0), (runs[1], 3));
        engine.execute(&ToggleHighlight).unwrap();

        assert_eq!(
            kinds(&engine, para),
            vec![(NodeType::Text, "one ".into()), (NodeType::Text, "two".into())]
        );
    }

    #[test]
    fn test_empty_selection_is_skipped() {
        let (mut engine, para, runs) = engine_with_runs(&["abc"]);
        select(&mut engine, (runs[0], 1), (runs[0], 1));
        let outcome = engine.execute(&ToggleHighlight).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::EmptySelection));

        engine.set_selection(None);
        let outcome = engine.execute(&ToggleHighlight).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::NoSelection));
        assert_eq!(kinds(&engine, para), vec![(NodeType::Text, "abc".into())]);
    }

    #[test]
    fn test_caret_inside_highlight_is_active() {
        let (mut engine, _, runs) = engine_with_runs(&["abc"]);
        select(&mut engine, (runs[0], 0), (runs[0], 3));
        engine.execute(&ToggleHighlight).unwrap();
        select(&mut engine, (runs[0], 1), (runs[0], 1));
        assert!(is_highlight_active(engine.tree(), &engine.selection().unwrap()));
    }

    #[test]
    fn test_attach_requires_registration() {
        let config = EditorConfig::with_nodes(&[NodeType::Paragraph, NodeType::Text]);
        let engine = EditingEngine::with_tree(DocumentTree::with_empty_paragraph(), config);
        let err = HighlightFeature::attach(&engine).unwrap_err();
        assert!(matches!(err, EditError::NodeNotRegistered(NodeType::Highlight)));

        let feature = HighlightFeature::attach(&EditingEngine::new()).unwrap();
        assert_eq!(feature.background_color(), "#b1fed5");
    }
}
