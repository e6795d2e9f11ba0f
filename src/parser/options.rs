//! Extraction options and configuration.

use super::table_detector::TableDetectorConfig;
use crate::error::{Error, Result};

/// Characters the math pattern looks for: operators and relations, Greek
/// letters, and sub/superscript digits.
pub const DEFAULT_MATH_PATTERN: &str = "[∫∑∏√∂∇∈∉⊂⊃∪∩±≤≥≠≈∞×÷]|[α-ωΑ-Ω]|[₀-₉]|[⁰-⁹]";

/// Options for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Text classification thresholds
    pub classifier: ClassifierConfig,

    /// Image noise filter
    pub image_filter: ImageFilter,

    /// Whether to process pages on the rayon pool
    pub parallel: bool,

    /// Whether to extract embedded images
    pub extract_images: bool,

    /// Whether to run table detection
    pub extract_tables: bool,

    /// Table detector thresholds
    pub table_detector: TableDetectorConfig,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient mode (skip unreadable pages and image lists).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the minimum stored size for an image to be kept.
    pub fn with_min_image_bytes(mut self, min_bytes: usize) -> Self {
        self.image_filter.min_bytes = min_bytes;
        self
    }

    /// Replace the classifier configuration.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Skip image extraction.
    pub fn without_images(mut self) -> Self {
        self.extract_images = false;
        self
    }

    /// Replace the table detector thresholds.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.table_detector = config;
        self
    }

    /// Skip table detection.
    pub fn without_tables(mut self) -> Self {
        self.extract_tables = false;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            classifier: ClassifierConfig::default(),
            image_filter: ImageFilter::default(),
            parallel: false,
            extract_images: true,
            extract_tables: true,
            table_detector: TableDetectorConfig::default(),
        }
    }
}

/// Error handling mode during extraction.
///
/// Only page text and image enumeration are affected; individual image
/// failures and table detection failures are always recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the run on the first unreadable page
    #[default]
    Strict,
    /// Record a warning and continue with an empty result for that page
    Lenient,
}

/// Thresholds used to classify text lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// A line larger than this is a heading
    pub heading_font_size: f32,

    /// A bold line larger than this is a heading
    pub bold_heading_font_size: f32,

    /// Leading characters that mark a list item
    pub list_markers: Vec<char>,

    /// Regex a line must match to count as a formula
    pub math_pattern: String,
}

impl ClassifierConfig {
    /// Check the thresholds and compile-check the math pattern.
    pub fn validate(&self) -> Result<()> {
        if !(self.heading_font_size > 0.0 && self.bold_heading_font_size > 0.0) {
            return Err(Error::InvalidConfig(
                "heading font sizes must be positive".to_string(),
            ));
        }
        regex::Regex::new(&self.math_pattern)
            .map(|_| ())
            .map_err(|e| Error::InvalidConfig(format!("math pattern: {}", e)))
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            heading_font_size: 14.0,
            bold_heading_font_size: 12.0,
            list_markers: vec!['•', '-'],
            math_pattern: DEFAULT_MATH_PATTERN.to_string(),
        }
    }
}

/// Drops images too small to be content (icons, bullets, rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFilter {
    /// Images whose stored bytes are shorter than this are discarded
    pub min_bytes: usize,
}

impl ImageFilter {
    /// Check whether an image of `byte_size` stored bytes is kept.
    pub fn keeps(&self, byte_size: usize) -> bool {
        byte_size >= self.min_bytes
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self { min_bytes: 1000 }
    }
}
