//! Footnote references and the footnote registry
//!
//! A footnote reference is an inline leaf in the host document. Its body is a
//! separate rich-text document stored as an opaque JSON value on the node; the
//! host traversal never descends into it.
//!
//! Reference numbers are derived from document order. They go stale while the
//! document is edited and are brought back in line by [`renumber`].

use crate::{DocumentTree, Node, NodeId, NodeKind, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

const ID_PREFIX: &str = "footnote-";
const PREVIEW_LEN: usize = 50;

// =============================================================================
// Footnote ID
// =============================================================================

/// Stable identifier of a footnote reference, `footnote-<unix millis>-<counter>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FootnoteId(String);

impl FootnoteId {
    /// Build an id from a timestamp and the document counter value
    pub fn generate(timestamp_millis: i64, counter: u64) -> Self {
        Self(format!("{ID_PREFIX}{timestamp_millis}-{counter}"))
    }

    /// Build an id stamped with the current wall-clock time
    pub fn now(counter: u64) -> Self {
        Self::generate(chrono::Utc::now().timestamp_millis(), counter)
    }

    /// Wrap an existing id string. Loaded documents may carry ids of any shape.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id has the generated `footnote-<millis>-<counter>` shape
    pub fn is_generated(&self) -> bool {
        static PATTERN: OnceLock<Option<regex_lite::Regex>> = OnceLock::new();
        PATTERN
            .get_or_init(|| regex_lite::Regex::new(r"^footnote-\d+-\d+$").ok())
            .as_ref()
            .map(|re| re.is_match(&self.0))
            .unwrap_or(false)
    }

    /// Timestamp and counter of a generated id
    pub fn parts(&self) -> Option<(i64, u64)> {
        let rest = self.0.strip_prefix(ID_PREFIX)?;
        let (millis, counter) = rest.split_once('-')?;
        Some((millis.parse().ok()?, counter.parse().ok()?))
    }
}

impl std::fmt::Display for FootnoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Footnote reference payload
// =============================================================================

/// Payload of a footnote reference node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootnoteRef {
    pub id: FootnoteId,
    /// 1-based position among all references, valid after renumbering
    pub number: u32,
    /// Legacy plain-text body
    pub content: String,
    /// Serialized body document, kept verbatim
    pub json: Option<Value>,
}

impl FootnoteRef {
    pub fn new(id: FootnoteId, number: u32) -> Self {
        Self {
            id,
            number,
            content: String::new(),
            json: None,
        }
    }

    /// Whether any body text has been written, in either representation
    pub fn has_body(&self) -> bool {
        self.json.is_some() || !self.content.is_empty()
    }

    /// Short plain-text preview of the body for listings
    pub fn preview(&self) -> Option<String> {
        let mut text = String::new();
        if let Some(json) = &self.json {
            collect_body_text(json, &mut text);
        }
        if text.is_empty() {
            text = self.content.clone();
        }
        if text.is_empty() {
            return None;
        }
        if text.chars().count() >= PREVIEW_LEN {
            text = text.chars().take(PREVIEW_LEN - 3).collect();
            text.push_str("...");
        }
        Some(text)
    }
}

/// Build a footnote payload. No side effects; the result is not attached anywhere.
pub fn create_footnote_reference(
    id: FootnoteId,
    number: u32,
    content: impl Into<String>,
    json: Option<Value>,
) -> FootnoteRef {
    FootnoteRef {
        id,
        number,
        content: content.into(),
        json: non_null_body(json),
    }
}

/// A stored `null` body is the same as no body
pub fn non_null_body(json: Option<Value>) -> Option<Value> {
    json.filter(|v| !v.is_null())
}

pub fn is_footnote_reference(node: &Node) -> bool {
    node.node_type() == NodeType::Footnote
}

/// Walk a serialized body and append the text of its runs.
fn collect_body_text(value: &Value, out: &mut String) {
    if out.chars().count() >= PREVIEW_LEN {
        return;
    }
    let Some(obj) = value.as_object() else {
        return;
    };
    if let Some(root) = obj.get("root") {
        collect_body_text(root, out);
        return;
    }
    match obj.get("type").and_then(Value::as_str) {
        Some("text") | Some("mark") => {
            if let Some(text) = obj.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        // Nested footnote bodies are not part of this body's text.
        Some("footnote") => {}
        _ => {
            if let Some(children) = obj.get("children").and_then(Value::as_array) {
                for child in children {
                    collect_body_text(child, out);
                }
            }
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Every footnote reference under `root`, in document order
pub fn collect_footnotes(tree: &DocumentTree, root: NodeId) -> Vec<NodeId> {
    tree.pre_order(root)
        .filter(|id| tree.node_type(*id) == Some(NodeType::Footnote))
        .collect()
}

/// Find the attached reference with the given id
pub fn find_footnote(tree: &DocumentTree, id: &FootnoteId) -> Option<NodeId> {
    tree.pre_order(tree.root_id())
        .find(|node_id| matches!(tree.kind(*node_id), Some(NodeKind::Footnote(f)) if &f.id == id))
}

/// Outcome of a renumbering pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenumberReport {
    /// References found
    pub count: usize,
    /// References whose number had to change
    pub changed: usize,
}

/// Assign `number = i + 1` to the i-th reference under `root` and set the
/// document counter to the number of references.
///
/// Only references whose number actually changes are written, so a second
/// pass touches nothing.
pub fn renumber(tree: &mut DocumentTree, root: NodeId) -> RenumberReport {
    let footnotes = collect_footnotes(tree, root);
    let mut changed = 0;

    for (index, node_id) in footnotes.iter().enumerate() {
        let number = (index + 1) as u32;
        let current = tree.kind(*node_id).and_then(NodeKind::footnote).map(|f| f.number);
        if current == Some(number) {
            continue;
        }
        if let Ok(node) = tree.get_writable(*node_id) {
            if let Some(footnote) = node.kind.footnote_mut() {
                footnote.number = number;
                changed += 1;
            }
        }
    }

    tree.set_footnote_counter(footnotes.len() as u64);
    tracing::debug!(count = footnotes.len(), changed, "renumbered footnotes");

    RenumberReport {
        count: footnotes.len(),
        changed,
    }
}

/// Information about a footnote for UI lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootnoteInfo {
    pub id: FootnoteId,
    pub number: u32,
    pub node_id: NodeId,
    pub preview: Option<String>,
}

/// Get a list of all footnotes in the document
pub fn list_footnotes(tree: &DocumentTree) -> Vec<FootnoteInfo> {
    collect_footnotes(tree, tree.root_id())
        .into_iter()
        .filter_map(|node_id| {
            let footnote = tree.kind(node_id)?.footnote()?;
            Some(FootnoteInfo {
                id: footnote.id.clone(),
                number: footnote.number,
                node_id,
                preview: footnote.preview(),
            })
        })
        .collect()
}
