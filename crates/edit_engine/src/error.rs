//! Error types for editing operations

use doc_model::NodeType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    /// A feature needs a node type the editor was not configured with
    #[error("Node type '{0}' is not registered on this editor")]
    NodeNotRegistered(NodeType),
}

pub type Result<T> = std::result::Result<T, EditError>;
