//! Text run payload shared by plain text and highlight nodes

use crate::TextFormat;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Editing mode of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    #[default]
    Normal,
    Token,
    Segmented,
}

impl TextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextMode::Normal => "normal",
            TextMode::Token => "token",
            TextMode::Segmented => "segmented",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(TextMode::Normal),
            "token" => Some(TextMode::Token),
            "segmented" => Some(TextMode::Segmented),
            _ => None,
        }
    }
}

/// Contiguous text with one set of format flags and one style string.
///
/// Offsets into a run are counted in grapheme clusters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub format: TextFormat,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub detail: u32,
    #[serde(default)]
    pub mode: TextMode,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_format(text: impl Into<String>, format: TextFormat, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format,
            style: style.into(),
            ..Default::default()
        }
    }

    /// A run with different text but the same formatting
    pub fn inherit(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: self.format,
            style: self.style.clone(),
            detail: self.detail,
            mode: self.mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in grapheme clusters
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Text between two grapheme offsets, clamped to the run
    pub fn slice(&self, start: usize, end: usize) -> String {
        if end <= start {
            return String::new();
        }
        self.text
            .graphemes(true)
            .skip(start)
            .take(end - start)
            .collect()
    }

    /// Split at a grapheme offset into (before, after)
    pub fn split_at(&self, offset: usize) -> (String, String) {
        let byte = self.byte_offset(offset);
        let (before, after) = self.text.split_at(byte);
        (before.to_string(), after.to_string())
    }

    fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
