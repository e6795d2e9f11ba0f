//! Document-level types.

use super::Page;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full structured extraction result for one input file.
///
/// Serializes to the `extracted_content.json` schema: `title`,
/// `source_file`, `pages`, followed by the aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title (the input file stem)
    pub title: String,

    /// Input file name
    pub source_file: String,

    /// Pages in physical order
    pub pages: Vec<Page>,

    /// Aggregate counts over all pages
    #[serde(flatten)]
    pub totals: ExtractionTotals,
}

impl Document {
    /// Create a new empty document.
    pub fn new(title: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_file: source_file.into(),
            pages: Vec::new(),
            totals: ExtractionTotals::default(),
        }
    }

    /// Create an empty document named after an input path.
    ///
    /// The title is the file stem and the source file the file name.
    pub fn for_source(path: &Path) -> Self {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let source_file = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::new(title, source_file)
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a mutable page by number (1-indexed).
    pub fn get_page_mut(&mut self, page_number: u32) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.page_number == page_number)
    }
}

/// Run-wide counters, summed once all pages are known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionTotals {
    /// Images kept across all pages
    pub total_images: usize,

    /// Tables kept across all pages
    pub total_tables: usize,

    /// Lines that matched the math pattern
    pub total_formulas: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_for_source() {
        let doc = Document::for_source(Path::new("pdfs/Lec 1 Fintech.pdf"));
        assert_eq!(doc.title, "Lec 1 Fintech");
        assert_eq!(doc.source_file, "Lec 1 Fintech.pdf");
        assert!(doc.pages.is_empty());
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_json_field_order() {
        let mut doc = Document::new("Lec", "Lec.pdf");
        doc.pages.push(Page::new(1));
        doc.totals.total_images = 2;

        let json = serde_json::to_string(&doc).unwrap();
        let title = json.find("\"title\"").unwrap();
        let pages = json.find("\"pages\"").unwrap();
        let images = json.find("\"total_images\"").unwrap();
        let formulas = json.find("\"total_formulas\"").unwrap();
        assert!(title < pages && pages < images && images < formulas);
        assert!(json.contains("\"total_images\":2"));
    }

    #[test]
    fn test_get_page_mut() {
        let mut doc = Document::new("t", "t.pdf");
        doc.pages.push(Page::new(1));
        doc.pages.push(Page::new(2));
        assert!(doc.get_page_mut(3).is_none());
        doc.get_page_mut(1).unwrap().has_formulas = true;
        assert!(doc.pages[0].has_formulas);
    }
}
