//! Import warnings

use doc_model::DocumentTree;

/// A non-fatal issue found while reading a portable document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub kind: WarningKind,
    /// Where the issue was found, e.g. `root.children[2]`
    pub path: String,
    pub message: String,
}

/// Types of import warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The node's `type` is not one this model knows; the node was skipped
    UnknownNodeType,
    /// A required field was absent; the node was skipped
    MissingField,
    /// A field had the wrong shape; a default was used instead
    InvalidField,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::UnknownNodeType => write!(f, "Unknown node type"),
            WarningKind::MissingField => write!(f, "Missing field"),
            WarningKind::InvalidField => write!(f, "Invalid field"),
        }
    }
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.path, self.message)
    }
}

/// Result of importing a portable document
#[derive(Debug)]
pub struct ImportResult {
    pub tree: DocumentTree,
    pub warnings: Vec<ImportWarning>,
}

impl ImportResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings_of_kind(&self, kind: WarningKind) -> Vec<&ImportWarning> {
        self.warnings.iter().filter(|w| w.kind == kind).collect()
    }
}
