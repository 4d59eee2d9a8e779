//! Editor-state serialization
//!
//! A document is stored as `{ "root": <root record> }`.

use crate::{build_tree, to_portable, ImportResult, PortableNode, Result, StoreError};
use doc_model::DocumentTree;
use serde_json::{json, Value};

/// Editor-state envelope for a whole document
pub fn to_editor_state(tree: &DocumentTree) -> Result<Value> {
    let root = to_portable(tree, tree.root_id())?;
    Ok(json!({ "root": root.to_value() }))
}

/// Serialize a document tree to JSON
pub fn serialize(tree: &DocumentTree) -> Result<String> {
    let state = to_editor_state(tree)?;
    Ok(serde_json::to_string_pretty(&state)?)
}

/// Deserialize a document tree from JSON.
///
/// Malformed JSON or a missing root is an error. Anything wrong further
/// down is reported as a warning on the result.
pub fn deserialize(json: &str) -> Result<ImportResult> {
    let value: Value = serde_json::from_str(json)?;
    from_editor_state(&value)
}

pub fn from_editor_state(value: &Value) -> Result<ImportResult> {
    let root = value
        .get("root")
        .ok_or_else(|| StoreError::InvalidFormat("editor state has no 'root'".to_string()))?;

    let parsed = PortableNode::parse(root);
    let mut warnings = parsed.warnings;
    let node = parsed
        .node
        .ok_or_else(|| StoreError::InvalidFormat("root record could not be read".to_string()))?;

    let tree = build_tree(&node, &mut warnings);
    Ok(ImportResult { tree, warnings })
}
