//! Line classification.

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{BlockType, TextBlock};
use crate::parser::{ClassifierConfig, TextLine};

/// Classified text of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    /// Blocks in line order
    pub blocks: Vec<TextBlock>,
    /// Lines that matched the math pattern, whatever type they were given
    pub formula_lines: usize,
}

impl PageText {
    /// Whether any line matched the math pattern.
    pub fn has_formulas(&self) -> bool {
        self.formula_lines > 0
    }
}

/// Turns a page's text lines into typed blocks.
#[derive(Debug, Clone)]
pub struct PageTextExtractor {
    config: ClassifierConfig,
    math: Regex,
}

impl PageTextExtractor {
    /// Create an extractor, compiling the configured math pattern.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let math = Regex::new(&config.math_pattern)
            .map_err(|e| Error::InvalidConfig(format!("math pattern: {}", e)))?;
        Ok(Self { config, math })
    }

    /// Classify every non-blank line of a page, keeping line order.
    pub fn extract(&self, lines: &[TextLine]) -> PageText {
        let mut page = PageText::default();

        for line in lines {
            let Some(first) = line.first_span() else {
                continue;
            };
            let text = line.text();
            let (block_type, is_formula) =
                self.classify(&text, first.font_size, first.is_bold);

            if let Some(block) = TextBlock::new(&text, block_type, first.font_size, first.is_bold) {
                if is_formula {
                    page.formula_lines += 1;
                }
                page.blocks.push(block);
            }
        }

        page
    }

    /// Classify one line of text.
    ///
    /// Returns the block type and whether the line matched the math pattern.
    /// Heading wins over formula, formula over list item.
    pub fn classify(&self, text: &str, font_size: f32, is_bold: bool) -> (BlockType, bool) {
        let is_formula = self.math.is_match(text);
        let is_heading = font_size > self.config.heading_font_size
            || (font_size > self.config.bold_heading_font_size && is_bold);

        let block_type = if is_heading {
            BlockType::Heading
        } else if is_formula {
            BlockType::Formula
        } else if text
            .trim()
            .starts_with(|c: char| self.config.list_markers.contains(&c))
        {
            BlockType::ListItem
        } else {
            BlockType::Paragraph
        };

        (block_type, is_formula)
    }
}
