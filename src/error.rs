//! Error types for the studypdf library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for studypdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting a document.
///
/// Only some of these abort a run. Per-image failures and a failed table
/// pass are caught inside the pipeline and surface as
/// [`ExtractionWarning`](crate::pipeline::ExtractionWarning)s instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input document does not exist.
    #[error("PDF file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The extraction engine could not open the document at all.
    #[error("Could not open document: {0}")]
    EngineOpen(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error extracting a single embedded image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// The table-detection pass failed.
    #[error("Table extraction error: {0}")]
    TableExtract(String),

    /// Extraction options are inconsistent (e.g. a math pattern that does not compile).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pages were handed to the assembler out of physical order.
    #[error("Page {found} received after page {previous}")]
    PageOrder { previous: u32, found: u32 },

    /// Error serializing output.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
