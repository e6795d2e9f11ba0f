//! Output bundle on disk.
//!
//! ```text
//! <root>/extracted_content.json
//! <root>/text/full_text.txt
//! <root>/images/page{N}_img{K}.{ext}
//! <root>/tables/page{N}_table{K}.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Document, Table, IMAGE_DIR, TABLE_DIR};
use crate::render::{to_json, to_plain_text, JsonFormat};

/// Directory, relative to the output root, that holds the plain-text view.
pub const TEXT_DIR: &str = "text";

/// File name of the structured document.
pub const DOCUMENT_FILE: &str = "extracted_content.json";

/// File name of the plain-text view inside [`TEXT_DIR`].
pub const TEXT_FILE: &str = "full_text.txt";

/// Writes extraction artifacts under one output directory.
///
/// Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    /// Create the output directory and its `text/`, `images/` and `tables/`
    /// subdirectories. Existing directories are reused.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in [TEXT_DIR, IMAGE_DIR, TABLE_DIR] {
            fs::create_dir_all(root.join(dir))?;
        }
        log::debug!("Output directory ready: {}", root.display());
        Ok(Self { root })
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an image's bytes as `images/<filename>`.
    pub fn write_image(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.root.join(IMAGE_DIR).join(filename);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// Write a table as pretty JSON to `tables/<filename>`.
    pub fn write_table(&self, filename: &str, table: &Table) -> Result<PathBuf> {
        let path = self.root.join(TABLE_DIR).join(filename);
        fs::write(&path, to_json(table, JsonFormat::Pretty)?)?;
        Ok(path)
    }

    /// Write the document as `extracted_content.json`.
    pub fn write_document(&self, doc: &Document) -> Result<PathBuf> {
        let path = self.root.join(DOCUMENT_FILE);
        fs::write(&path, to_json(doc, JsonFormat::Pretty)?)?;
        Ok(path)
    }

    /// Write the plain-text view as `text/full_text.txt`.
    pub fn write_text(&self, doc: &Document) -> Result<PathBuf> {
        let path = self.root.join(TEXT_DIR).join(TEXT_FILE);
        fs::write(&path, to_plain_text(doc))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");

        OutputWriter::create(&root).unwrap();
        let writer = OutputWriter::create(&root).unwrap();

        assert!(root.join("text").is_dir());
        assert!(root.join("images").is_dir());
        assert!(root.join("tables").is_dir());
        assert_eq!(writer.root(), root.as_path());
    }

    #[test]
    fn test_write_image_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::create(dir.path()).unwrap();

        writer.write_image("page1_img1.png", &[1, 2, 3]).unwrap();
        let path = writer.write_image("page1_img1.png", &[9]).unwrap();

        assert_eq!(fs::read(path).unwrap(), vec![9]);
    }

    #[test]
    fn test_write_document_and_text() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::create(dir.path()).unwrap();
        let doc = Document::new("Lec 2", "Lec 2.pdf");

        let json_path = writer.write_document(&doc).unwrap();
        let text_path = writer.write_text(&doc).unwrap();

        assert_eq!(json_path, dir.path().join("extracted_content.json"));
        let text = fs::read_to_string(text_path).unwrap();
        assert!(text.starts_with("# Lec 2\nSource: Lec 2.pdf\n"));
    }
}
