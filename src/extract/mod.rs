//! Per-concern extractors driven by the pipeline.

mod images;
mod tables;
mod text;

pub use images::{ImageExtractor, PageImages};
pub use tables::{TableExtractor, TablePass};
pub use text::{PageText, PageTextExtractor};
