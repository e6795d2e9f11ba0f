//! Page-level types.

use super::{ImageRef, TableRef, TextBlock};
use serde::{Deserialize, Serialize};

/// One physical page's extracted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Classified text in reading order
    pub text_blocks: Vec<TextBlock>,

    /// Images kept on this page
    pub images: Vec<ImageRef>,

    /// Tables kept on this page
    pub tables: Vec<TableRef>,

    /// Whether any line on the page matched the math pattern
    pub has_formulas: bool,
}

impl Page {
    /// Create an empty page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            text_blocks: Vec::new(),
            images: Vec::new(),
            tables: Vec::new(),
            has_formulas: false,
        }
    }
}
