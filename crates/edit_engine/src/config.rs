//! Editor configuration

use crate::{EditError, Result};
use doc_model::{NodeType, DEFAULT_HIGHLIGHT_COLOR};
use serde::{Deserialize, Serialize};

/// Editor-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Node types the host editor knows how to hold
    pub registered_nodes: Vec<NodeType>,
    pub highlight: HighlightConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            registered_nodes: NodeType::ALL.to_vec(),
            highlight: HighlightConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, falling back to defaults when it is malformed
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str::<EditorConfig>(json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse editor config, using defaults: {}", e);
                EditorConfig::default()
            }
        }
    }

    /// Config registering only the given node types (plus the root)
    pub fn with_nodes(nodes: &[NodeType]) -> Self {
        let mut registered_nodes = vec![NodeType::Root];
        registered_nodes.extend(nodes.iter().copied().filter(|t| *t != NodeType::Root));
        Self {
            registered_nodes,
            ..Default::default()
        }
    }

    pub fn is_registered(&self, node_type: NodeType) -> bool {
        self.registered_nodes.contains(&node_type)
    }

    /// Fail with the first node type in `required` that is not registered
    pub fn ensure_registered(&self, required: &[NodeType]) -> Result<()> {
        match required.iter().find(|t| !self.is_registered(**t)) {
            Some(missing) => Err(EditError::NodeNotRegistered(*missing)),
            None => Ok(()),
        }
    }
}

/// Highlight appearance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HighlightConfig {
    pub background_color: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
        }
    }
}
