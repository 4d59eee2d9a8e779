//! Error types for document tree operations

use crate::{NodeId, NodeType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid position: node {node_id}, offset {offset}")]
    InvalidPosition { node_id: NodeId, offset: usize },

    #[error("Node {node_id} of type '{node_type}' cannot have children")]
    NotAnElement { node_id: NodeId, node_type: NodeType },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Tree structure error: {0}")]
    TreeStructureError(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
