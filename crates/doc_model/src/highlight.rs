//! Highlight spans
//!
//! A highlight is a text run rendered with a marker background. It carries
//! exactly the same payload as a plain text run, so converting between the
//! two never loses text, format flags or style.

use crate::{Node, NodeKind, NodeType, TextFormat, TextRun};

/// Background applied to highlights when nothing else is configured
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#b1fed5";

/// Build a highlight payload. Callers pass the formatting of the run being converted.
pub fn create_highlight(text: impl Into<String>, format: TextFormat, style: impl Into<String>) -> NodeKind {
    NodeKind::Highlight(TextRun::with_format(text, format, style))
}

pub fn is_highlight(node: &Node) -> bool {
    node.node_type() == NodeType::Highlight
}

impl TextRun {
    pub fn into_highlight(self) -> NodeKind {
        NodeKind::Highlight(self)
    }
}

/// Convert a highlight payload back to a plain text payload.
///
/// Any other payload is returned unchanged.
pub fn highlight_to_text(kind: NodeKind) -> NodeKind {
    match kind {
        NodeKind::Highlight(run) => NodeKind::Text(run),
        other => other,
    }
}
