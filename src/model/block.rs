//! Classified text blocks.

use serde::{Deserialize, Serialize};

/// Classification of one text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Large or bold-and-medium text.
    Heading,
    /// Line containing mathematical symbols.
    Formula,
    /// Line starting with a bullet or dash.
    ListItem,
    /// Anything else.
    Paragraph,
}

impl BlockType {
    /// Name as it appears in the JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Formula => "formula",
            BlockType::ListItem => "list_item",
            BlockType::Paragraph => "paragraph",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified unit of text, in page reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Trimmed, never empty.
    pub text: String,

    /// Block classification
    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Font size of the line's first span, rounded to one decimal
    pub font_size: f32,

    /// Whether the line's first span uses a bold font
    pub is_bold: bool,
}

impl TextBlock {
    /// Create a block, trimming `text` and rounding `font_size` to one decimal.
    ///
    /// Returns `None` when the trimmed text is empty.
    pub fn new(
        text: &str,
        block_type: BlockType,
        font_size: f32,
        is_bold: bool,
    ) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            block_type,
            font_size: round_to_tenth(font_size),
            is_bold,
        })
    }
}

fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
