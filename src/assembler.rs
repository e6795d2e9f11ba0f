//! Document assembly.
//!
//! Pages arrive from the first pass in physical order; table refs from the
//! second pass are attached afterwards by page number. Totals are computed
//! once, when the document is finished.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::extract::PageText;
use crate::model::{Document, ExtractionTotals, ImageRef, Page, TableRef};
use crate::pipeline::ExtractionWarning;

/// Builds a [`Document`] from per-page results.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    doc: Document,
    formula_lines: usize,
}

impl DocumentAssembler {
    /// Start an empty document.
    pub fn new(title: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            doc: Document::new(title, source_file),
            formula_lines: 0,
        }
    }

    /// Start an empty document named after an input path.
    pub fn for_source(path: &Path) -> Self {
        Self {
            doc: Document::for_source(path),
            formula_lines: 0,
        }
    }

    /// Append a page's text and images.
    ///
    /// Page numbers must be strictly increasing.
    pub fn push_page(&mut self, page_number: u32, text: PageText, images: Vec<ImageRef>) -> Result<()> {
        if let Some(previous) = self.doc.pages.last().map(|p| p.page_number) {
            if page_number <= previous {
                return Err(Error::PageOrder {
                    previous,
                    found: page_number,
                });
            }
        }

        let mut page = Page::new(page_number);
        page.has_formulas = text.has_formulas();
        page.text_blocks = text.blocks;
        page.images = images;

        self.formula_lines += text.formula_lines;
        self.doc.pages.push(page);
        Ok(())
    }

    /// Attach table refs to their pages.
    ///
    /// Refs for pages the document does not have are dropped, and a warning
    /// is returned for each such page.
    pub fn attach_tables(&mut self, tables: BTreeMap<u32, Vec<TableRef>>) -> Vec<ExtractionWarning> {
        let mut warnings = Vec::new();

        for (page_number, refs) in tables {
            match self.doc.get_page_mut(page_number) {
                Some(page) => page.tables.extend(refs),
                None => {
                    log::warn!(
                        "Dropping {} table(s) for unknown page {}",
                        refs.len(),
                        page_number
                    );
                    warnings.push(ExtractionWarning::OrphanTables {
                        page: page_number,
                        count: refs.len(),
                    });
                }
            }
        }

        warnings
    }

    /// Number of pages pushed so far.
    pub fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    /// Compute the totals and return the finished document.
    pub fn finish(mut self) -> Document {
        self.doc.totals = ExtractionTotals {
            total_images: self.doc.pages.iter().map(|p| p.images.len()).sum(),
            total_tables: self.doc.pages.iter().map(|p| p.tables.len()).sum(),
            total_formulas: self.formula_lines,
        };
        self.doc
    }
}
