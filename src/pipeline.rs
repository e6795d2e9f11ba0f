//! Extraction pipeline.
//!
//! Pass 1 walks the pages in order, classifying text and writing images.
//! Pass 2 runs table detection over the whole document. The assembled
//! document and its plain-text view are written last.

use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::assembler::DocumentAssembler;
use crate::error::{Error, Result};
use crate::extract::{ImageExtractor, PageText, PageTextExtractor, TableExtractor};
use crate::model::{Document, ImageRef};
use crate::parser::{ContentSource, ErrorMode, ExtractOptions, TableSource};
use crate::writer::OutputWriter;

/// A problem that was recovered from during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// A page's text could not be read (lenient mode only).
    PageText { page: u32, reason: String },
    /// A page's images could not be listed (lenient mode only).
    ImageList { page: u32, reason: String },
    /// One image could not be extracted or written. `index` is its
    /// 1-indexed position among all images on the page.
    Image {
        page: u32,
        index: usize,
        reason: String,
    },
    /// Table detection failed; the run has no tables.
    Tables { reason: String },
    /// Tables were reported for a page the document does not have.
    OrphanTables { page: u32, count: usize },
}

impl ExtractionWarning {
    pub(crate) fn image(page: u32, index: usize, err: &Error) -> Self {
        ExtractionWarning::Image {
            page,
            index,
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::PageText { page, reason } => {
                write!(f, "page {}: text skipped: {}", page, reason)
            }
            ExtractionWarning::ImageList { page, reason } => {
                write!(f, "page {}: images skipped: {}", page, reason)
            }
            ExtractionWarning::Image {
                page,
                index,
                reason,
            } => write!(f, "page {}: image {} skipped: {}", page, index, reason),
            ExtractionWarning::Tables { reason } => {
                write!(f, "table extraction failed: {}", reason)
            }
            ExtractionWarning::OrphanTables { page, count } => {
                write!(f, "{} table(s) dropped for unknown page {}", count, page)
            }
        }
    }
}

/// Progress events emitted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A page finished pass 1. Pages may finish out of order in parallel mode.
    PageDone { page: u32, total: usize },
    /// Table detection started.
    TablesStarted,
    /// Table detection finished with `count` kept tables.
    TablesDone { count: usize },
    /// The document and text view are being written.
    Writing,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// The document as written to `extracted_content.json`
    pub document: Document,
    /// Recovered problems, in the order they were encountered
    pub warnings: Vec<ExtractionWarning>,
    /// Output root the artifacts were written under
    pub output_dir: PathBuf,
}

impl ExtractionReport {
    /// Check if anything was skipped during the run.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Pass-1 result of one page.
struct PageResult {
    page: u32,
    text: PageText,
    images: Vec<ImageRef>,
    warnings: Vec<ExtractionWarning>,
}

/// Runs both passes and writes the output bundle.
#[derive(Debug, Clone)]
pub struct Extractor {
    options: ExtractOptions,
    text: PageTextExtractor,
    images: ImageExtractor,
    tables: TableExtractor,
}

impl Extractor {
    /// Create an extractor, validating the classifier configuration.
    pub fn new(options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            text: PageTextExtractor::new(options.classifier.clone())?,
            images: ImageExtractor::new(options.image_filter),
            tables: TableExtractor::new(),
            options,
        })
    }

    /// The options this extractor was built with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract a document.
    ///
    /// `source_path` only names the document; content is read through
    /// `content` and `tables`.
    pub fn run(
        &self,
        source_path: &Path,
        content: &dyn ContentSource,
        tables: &dyn TableSource,
        writer: &OutputWriter,
    ) -> Result<ExtractionReport> {
        self.run_with_progress(source_path, content, tables, writer, &|_: Progress| {})
    }

    /// Extract a document, reporting progress.
    pub fn run_with_progress(
        &self,
        source_path: &Path,
        content: &dyn ContentSource,
        tables: &dyn TableSource,
        writer: &OutputWriter,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<ExtractionReport> {
        let pages = content.page_numbers();
        let total = pages.len();
        log::info!(
            "Extracting {} page(s) from {}",
            total,
            source_path.display()
        );

        let process = |&page: &u32| {
            let result = self.process_page(content, page, writer);
            progress(Progress::PageDone { page, total });
            result
        };

        // Results come back in page order either way
        let results: Vec<PageResult> = if self.options.parallel {
            pages.par_iter().map(process).collect::<Result<_>>()?
        } else {
            pages.iter().map(process).collect::<Result<_>>()?
        };

        let mut assembler = DocumentAssembler::for_source(source_path);
        let mut warnings = Vec::new();
        for result in results {
            assembler.push_page(result.page, result.text, result.images)?;
            warnings.extend(result.warnings);
        }

        if self.options.extract_tables {
            progress(Progress::TablesStarted);
            let pass = self.tables.extract(tables, writer)?;
            progress(Progress::TablesDone {
                count: pass.count(),
            });
            warnings.extend(pass.warning);
            warnings.extend(assembler.attach_tables(pass.tables));
        }

        let document = assembler.finish();

        progress(Progress::Writing);
        writer.write_document(&document)?;
        writer.write_text(&document)?;

        log::info!(
            "Extracted {} pages, {} images, {} tables, {} formulas",
            document.page_count(),
            document.totals.total_images,
            document.totals.total_tables,
            document.totals.total_formulas
        );

        Ok(ExtractionReport {
            document,
            warnings,
            output_dir: writer.root().to_path_buf(),
        })
    }

    fn process_page(
        &self,
        content: &dyn ContentSource,
        page: u32,
        writer: &OutputWriter,
    ) -> Result<PageResult> {
        let lenient = self.options.error_mode == ErrorMode::Lenient;
        let mut warnings = Vec::new();

        let lines = match content.page_lines(page) {
            Ok(lines) => lines,
            Err(e) if lenient => {
                log::warn!("Failed to extract text from page {}: {}", page, e);
                warnings.push(ExtractionWarning::PageText {
                    page,
                    reason: e.to_string(),
                });
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let text = self.text.extract(&lines);

        let mut images = Vec::new();
        if self.options.extract_images {
            match self.images.extract_page(content, page, writer) {
                Ok(page_images) => {
                    images = page_images.images;
                    warnings.extend(page_images.warnings);
                }
                Err(e) if lenient => {
                    log::warn!("Failed to list images on page {}: {}", page, e);
                    warnings.push(ExtractionWarning::ImageList {
                        page,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Page {}: {} blocks, {} images",
            page,
            text.blocks.len(),
            images.len()
        );

        Ok(PageResult {
            page,
            text,
            images,
            warnings,
        })
    }
}
