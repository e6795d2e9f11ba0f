//! # studypdf
//!
//! Turns PDF course material into a structured bundle for downstream study
//! tools: classified text (headings, paragraphs, list items, formulas),
//! embedded images, and detected tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> studypdf::Result<()> {
//!     let report = studypdf::extract_file("Lec 3 Bonds.pdf", "extracted/Lec 3 Bonds")?;
//!     println!("{} formulas", report.document.totals.total_formulas);
//!     Ok(())
//! }
//! ```
//!
//! ## Output
//!
//! ```text
//! <output_dir>/extracted_content.json
//! <output_dir>/text/full_text.txt
//! <output_dir>/images/page{N}_img{K}.{ext}
//! <output_dir>/tables/page{N}_table{K}.json
//! ```
//!
//! ## Features
//!
//! - **Layout-aware text**: lines grouped from content-stream positions and
//!   classified by font size, weight and content
//! - **Image extraction**: JPEG and JPEG 2000 passed through, raw samples
//!   re-encoded as PNG, icons and decorations filtered out
//! - **Table detection**: stream-mode detection from text alignment
//! - **Parallel processing**: opt-in rayon page processing with output
//!   identical to a sequential run

pub mod assembler;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod writer;

// Re-export commonly used types
pub use assembler::DocumentAssembler;
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
pub use error::{Error, Result};
pub use extract::{ImageExtractor, PageText, PageTextExtractor, TableExtractor};
pub use model::{
    BlockType, Document, ExtractionTotals, ImageRef, Page, Table, TableRef, TextBlock,
};
pub use parser::{
    ClassifierConfig, ContentSource, ErrorMode, ExtractOptions, ImageFilter, LopdfBackend,
    TableDetectorConfig, TableSource,
};
pub use pipeline::{ExtractionReport, ExtractionWarning, Extractor, Progress};
pub use render::{to_json, to_plain_text, JsonFormat};
pub use writer::OutputWriter;

use std::path::{Path, PathBuf};

/// Default output directory for an input file: `extracted/<file stem>`.
pub fn default_output_dir<P: AsRef<Path>>(input: P) -> PathBuf {
    let stem = input
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Path::new("extracted").join(stem)
}

/// Extract a PDF file into `output_dir` with default options.
///
/// # Example
///
/// ```no_run
/// let report = studypdf::extract_file("lecture.pdf", "out/lecture").unwrap();
/// for warning in &report.warnings {
///     eprintln!("{}", warning);
/// }
/// ```
pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
) -> Result<ExtractionReport> {
    extract_file_with_options(input, output_dir, ExtractOptions::default())
}

/// Extract a PDF file into `output_dir` with custom options.
///
/// # Example
///
/// ```no_run
/// use studypdf::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .lenient()
///     .with_parallel(true)
///     .with_min_image_bytes(4096);
/// let report = extract_file_with_options("lecture.pdf", "out/lecture", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    options: ExtractOptions,
) -> Result<ExtractionReport> {
    extract_file_with_progress(input, output_dir, options, &|_: Progress| {})
}

/// Extract a PDF file, reporting progress as pages and passes finish.
pub fn extract_file_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    options: ExtractOptions,
    progress: &(dyn Fn(Progress) + Sync),
) -> Result<ExtractionReport> {
    let input = input.as_ref();
    let table_config = options.table_detector.clone();
    let extractor = Extractor::new(options)?;
    let backend = open(input)?.with_table_config(table_config);
    let writer = OutputWriter::create(output_dir.as_ref())?;
    extractor.run_with_progress(input, &backend, &backend, &writer, progress)
}

/// Open a PDF file with the bundled engine after checking its header.
pub fn open<P: AsRef<Path>>(input: P) -> Result<LopdfBackend> {
    let input = input.as_ref();
    let format = detect_format_from_path(input)?;
    log::debug!("Detected {} in {}", format, input.display());
    LopdfBackend::open(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir("pdfs/Lec 4 Options.pdf"),
            PathBuf::from("extracted/Lec 4 Options")
        );
    }

    #[test]
    fn test_missing_input_fails_before_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");

        let err = extract_file(dir.path().join("missing.pdf"), &out).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_non_pdf_input_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.pdf");
        std::fs::write(&input, "<html>not a pdf</html>").unwrap();

        let err = extract_file(&input, dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }
}
