//! Render settings

use doc_model::DEFAULT_HIGHLIGHT_COLOR;
use serde::{Deserialize, Serialize};

/// Configuration for render conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render each footnote's body beneath its marker
    pub expand_footnote_bodies: bool,
    /// Heading of the generated footnote section
    pub footnote_heading: String,
    /// Text of the link from a section entry back to its marker
    pub back_link_text: String,
    /// Background color for highlights
    pub highlight_color: String,
    /// Id prefix of inline markers
    pub anchor_prefix: String,
    /// Id prefix of section entries
    pub ref_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            expand_footnote_bodies: false,
            footnote_heading: "Footnotes".to_string(),
            back_link_text: " \u{21a9}".to_string(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            anchor_prefix: "footnote-anchor-".to_string(),
            ref_prefix: "footnote-ref-".to_string(),
        }
    }
}

impl RenderConfig {
    /// Id of the inline marker for footnote `number`
    pub fn anchor_id(&self, number: u32) -> String {
        format!("{}{}", self.anchor_prefix, number)
    }

    /// Id of the section entry for footnote `number`
    pub fn ref_id(&self, number: u32) -> String {
        format!("{}{}", self.ref_prefix, number)
    }
}
