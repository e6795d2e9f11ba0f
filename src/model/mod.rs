//! Document model for extracted course material.
//!
//! This is the representation written to `extracted_content.json` and the
//! only input downstream tooling reads. Images and tables are kept as
//! lightweight refs; their payloads live in separate files.

mod block;
mod document;
mod page;
mod resource;
mod table;

pub use block::{BlockType, TextBlock};
pub use document::{Document, ExtractionTotals};
pub use page::Page;
pub use resource::{image_filename, ImageRef, IMAGE_DIR};
pub use table::{table_filename, RawTable, Table, TableRef, TABLE_DIR};
