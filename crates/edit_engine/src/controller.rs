//! Footnote lifecycle controller
//!
//! UI-side state for footnote bodies. The controller listens to editor
//! signals, keeps at most one open body editor ([`EditorSurface`]) and
//! tracks where each footnote is in its lifecycle:
//!
//! ```text
//! absent -> inserted -> editing -> saved -> removed
//! ```
//!
//! The document itself is only changed through engine commands.

use crate::{
    Anchor, CommandOutcome, EditorSignal, EditingEngine, FootnoteSnapshot, RemoveFootnote, Result,
    SaveFootnoteContent, SignalReceiver, SkipReason,
};
use doc_model::{non_null_body, FootnoteId, NodeId, NodeType};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    /// Read-only popup
    View,
    Edit,
}

/// The open footnote body editor
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSurface {
    pub footnote_id: FootnoteId,
    pub node_id: NodeId,
    pub number: u32,
    pub mode: SurfaceMode,
    pub anchor: Option<Anchor>,
    pub json: Option<Value>,
    pub content: String,
}

impl EditorSurface {
    fn open(footnote: FootnoteSnapshot, mode: SurfaceMode, anchor: Option<Anchor>) -> Self {
        Self {
            footnote_id: footnote.footnote_id,
            node_id: footnote.node,
            number: footnote.number,
            mode,
            anchor,
            json: footnote.json,
            content: footnote.content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootnoteState {
    /// Inserted with an empty body
    Inserted,
    Editing,
    Saved,
    Removed,
}

pub struct FootnoteController {
    signals: SignalReceiver,
    surface: Option<EditorSurface>,
    states: HashMap<FootnoteId, FootnoteState>,
}

impl FootnoteController {
    /// Subscribe to an editor. Fails when the editor cannot hold footnotes.
    pub fn attach(engine: &mut EditingEngine) -> Result<Self> {
        engine.config().ensure_registered(&[NodeType::Footnote])?;
        Ok(Self {
            signals: engine.subscribe(),
            surface: None,
            states: HashMap::new(),
        })
    }

    /// The currently open body editor
    pub fn surface(&self) -> Option<&EditorSurface> {
        self.surface.as_ref()
    }

    pub fn state(&self, id: &FootnoteId) -> Option<FootnoteState> {
        self.states.get(id).copied()
    }

    /// Process every signal received so far. Returns how many were handled.
    pub fn sync(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(signal) = self.signals.try_recv() {
            self.handle(signal);
            handled += 1;
        }
        handled
    }

    fn handle(&mut self, signal: EditorSignal) {
        match signal {
            EditorSignal::OpenFootnoteModal { footnote, anchor } => {
                self.states.insert(footnote.footnote_id.clone(), FootnoteState::Inserted);
                self.surface = Some(EditorSurface::open(footnote, SurfaceMode::Edit, anchor));
            }
            EditorSignal::FootnoteClick { footnote, anchor } => {
                self.states.insert(footnote.footnote_id.clone(), FootnoteState::Editing);
                self.surface = Some(EditorSurface::open(footnote, SurfaceMode::Edit, anchor));
            }
            EditorSignal::FootnoteMouseEnter { footnote, anchor } => {
                self.surface = Some(EditorSurface::open(footnote, SurfaceMode::View, anchor));
            }
            EditorSignal::FootnoteSaved { footnote_id, .. } => {
                self.states.insert(footnote_id.clone(), FootnoteState::Saved);
                if let Some(surface) = self.surface.as_mut().filter(|s| s.footnote_id == footnote_id) {
                    surface.mode = SurfaceMode::View;
                }
            }
            EditorSignal::FootnoteRemoved { footnote_id, .. } => {
                self.states.insert(footnote_id.clone(), FootnoteState::Removed);
                if self.surface.as_ref().is_some_and(|s| s.footnote_id == footnote_id) {
                    self.surface = None;
                }
            }
        }
    }

    /// Switch the open surface to edit mode
    pub fn edit(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        surface.mode = SurfaceMode::Edit;
        self.states.insert(surface.footnote_id.clone(), FootnoteState::Editing);
        true
    }

    /// Write `json` into the footnote bound to the open surface
    pub fn save(&mut self, engine: &mut EditingEngine, json: Value) -> Result<CommandOutcome> {
        let Some(footnote_id) = self.surface.as_ref().map(|s| s.footnote_id.clone()) else {
            return Ok(CommandOutcome::Skipped(SkipReason::NoOpenEditor));
        };
        let command = SaveFootnoteContent::new(footnote_id, Some(json.clone()));
        let outcome = engine.execute(&command)?;
        if outcome.applied() {
            if let Some(surface) = self.surface.as_mut() {
                surface.json = non_null_body(Some(json));
            }
        }
        self.sync();
        Ok(outcome)
    }

    /// Close the open surface without touching the document
    pub fn close(&mut self) -> Option<EditorSurface> {
        self.surface.take()
    }

    /// Close the open surface and delete its footnote
    pub fn discard(&mut self, engine: &mut EditingEngine) -> Result<CommandOutcome> {
        let Some(surface) = self.surface.take() else {
            return Ok(CommandOutcome::Skipped(SkipReason::NoOpenEditor));
        };
        let outcome = engine.execute(&RemoveFootnote::node(surface.node_id))?;
        self.sync();
        Ok(outcome)
    }
}

impl std::fmt::Debug for FootnoteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FootnoteController")
            .field("surface", &self.surface)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditError, EditorConfig, InsertFootnote, NoAnchors};
    use doc_model::{DocumentTree, NodeKind, Position, Selection};
    use serde_json::json;

    fn setup() -> (EditingEngine, FootnoteController) {
        let mut engine = EditingEngine::new();
        let controller = FootnoteController::attach(&mut engine).unwrap();
        (engine, controller)
    }

    fn insert(engine: &mut EditingEngine) -> NodeId {
        let root = engine.tree().root_id();
        let para = engine.tree().children(root)[0];
        let len = engine.tree().children(para).len();
        engine.set_selection(Some(Selection::collapsed(Position::new(para, len))));
        engine.execute(&InsertFootnote::new()).unwrap();
        engine.tree().children(para)[len]
    }

    fn footnote_id(engine: &EditingEngine, node: NodeId) -> FootnoteId {
        engine.tree().kind(node).unwrap().footnote().unwrap().id.clone()
    }

    #[test]
    fn test_attach_requires_footnote_node() {
        let config = EditorConfig::with_nodes(&[NodeType::Paragraph, NodeType::Text]);
        let mut engine = EditingEngine::with_tree(DocumentTree::with_empty_paragraph(), config);
        let err = FootnoteController::attach(&mut engine).unwrap_err();
        assert!(matches!(err, EditError::NodeNotRegistered(NodeType::Footnote)));
    }

    #[test]
    fn test_insert_opens_edit_surface() {
        let (mut engine, mut controller) = setup();
        let node = insert(&mut engine);
        assert_eq!(controller.sync(), 1);

        let surface = controller.surface().unwrap();
        assert_eq!(surface.node_id, node);
        assert_eq!(surface.mode, SurfaceMode::Edit);
        assert!(surface.json.is_none());
        assert_eq!(
            controller.state(&footnote_id(&engine, node)),
            Some(FootnoteState::Inserted)
        );
    }

    #[test]
    fn test_missing_anchor_still_opens() {
        let (mut engine, mut controller) = setup();
        engine.set_anchor_resolver(NoAnchors);
        insert(&mut engine);
        controller.sync();
        let surface = controller.surface().unwrap();
        assert!(surface.anchor.is_none());
    }

    #[test]
    fn test_save_updates_document_and_state() {
        let (mut engine, mut controller) = setup();
        let node = insert(&mut engine);
        controller.sync();

        let body = json!({"root": {"type": "root", "children": []}});
        let outcome = controller.save(&mut engine, body.clone()).unwrap();
        assert!(outcome.applied());

        let id = footnote_id(&engine, node);
        assert_eq!(engine.tree().kind(node).unwrap().footnote().unwrap().json, Some(body));
        assert_eq!(controller.state(&id), Some(FootnoteState::Saved));
        assert_eq!(controller.surface().unwrap().mode, SurfaceMode::View);
    }

    #[test]
    fn test_failed_save_keeps_surface_body() {
        let (mut engine, mut controller) = setup();
        let node = insert(&mut engine);
        let id = footnote_id(&engine, node);
        controller.sync();

        // Dropped without a removal signal
        engine
            .update(|tx| {
                tx.tree_mut().remove(node)?;
                Ok(())
            })
            .unwrap();

        let outcome = controller.save(&mut engine, json!({"root": {}})).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::FootnoteNotFound(id.clone())));
        let surface = controller.surface().unwrap();
        assert_eq!(surface.footnote_id, id);
        assert!(surface.json.is_none());
        assert_eq!(controller.state(&id), Some(FootnoteState::Inserted));
    }

    #[test]
    fn test_single_open_surface() {
        let (mut engine, mut controller) = setup();
        let first = insert(&mut engine);
        let second = insert(&mut engine);
        controller.sync();
        assert_eq!(controller.surface().unwrap().node_id, second);

        assert!(engine.footnote_pointer_down(first));
        controller.sync();
        let surface = controller.surface().unwrap();
        assert_eq!(surface.node_id, first);
        assert_eq!(surface.mode, SurfaceMode::View);

        assert!(engine.footnote_clicked(second));
        controller.sync();
        assert_eq!(controller.surface().unwrap().node_id, second);
        assert_eq!(controller.surface().unwrap().mode, SurfaceMode::Edit);
        assert_eq!(
            controller.state(&footnote_id(&engine, second)),
            Some(FootnoteState::Editing)
        );
    }

    #[test]
    fn test_discard_removes_footnote() {
        let (mut engine, mut controller) = setup();
        let node = insert(&mut engine);
        let id = footnote_id(&engine, node);
        controller.sync();

        assert!(controller.discard(&mut engine).unwrap().applied());
        assert!(controller.surface().is_none());
        assert!(!engine.tree().contains(node));
        assert_eq!(controller.state(&id), Some(FootnoteState::Removed));

        // Nothing open any more
        let outcome = controller.discard(&mut engine).unwrap();
        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::NoOpenEditor));
    }

    #[test]
    fn test_close_keeps_document() {
        let (mut engine, mut controller) = setup();
        let node = insert(&mut engine);
        controller.sync();

        let closed = controller.close().unwrap();
        assert_eq!(closed.node_id, node);
        assert!(controller.surface().is_none());
        assert!(matches!(engine.tree().kind(node), Some(NodeKind::Footnote(_))));

        let outcome = controller.save(&mut engine, json!({})).unwrap();
        assert!(!outcome.applied());
    }

    #[test]
    fn test_removal_elsewhere_closes_bound_surface() {
        let (mut engine, mut controller) = setup();
        let node = insert(&mut engine);
        controller.sync();
        assert!(controller.edit());

        engine.execute(&RemoveFootnote::node(node)).unwrap();
        controller.sync();
        assert!(controller.surface().is_none());
    }
}
