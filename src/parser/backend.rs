//! Document engine abstraction.
//!
//! The pipeline reads documents only through [`ContentSource`] and
//! [`TableSource`], so any engine (or a test fake) can drive it.
//! [`LopdfBackend`] is the engine shipped with the crate.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::RawTable;

use super::image_decode::{decode_image_stream, RawImage};
use super::layout::{extract_page_lines, extract_page_spans, TextLine};
use super::table_detector::{TableDetector, TableDetectorConfig};

/// Engine-local image identifier: (object number, generation number).
pub type ImageId = (u32, u16);

/// Per-page text and image access.
pub trait ContentSource: Sync {
    /// All page numbers (1-indexed) in physical order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Text lines of a page in reading order.
    fn page_lines(&self, page: u32) -> Result<Vec<TextLine>>;

    /// Embedded raster images referenced by a page, in resource order.
    fn page_images(&self, page: u32) -> Result<Vec<ImageId>>;

    /// Extract one image's stored bytes.
    fn extract_image(&self, id: ImageId) -> Result<RawImage>;
}

/// Whole-document table detection.
pub trait TableSource: Sync {
    /// Detected tables keyed by page number. Pages without tables may be absent.
    fn detect_tables(&self) -> Result<BTreeMap<u32, Vec<RawTable>>>;
}

/// [`ContentSource`] and [`TableSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    table_config: TableDetectorConfig,
}

impl LopdfBackend {
    /// Open a document from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        LopdfDocument::load(path)
            .map(Self::from_document)
            .map_err(open_error)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        LopdfDocument::load_mem(data)
            .map(Self::from_document)
            .map_err(open_error)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self {
            doc,
            pages,
            table_config: TableDetectorConfig::default(),
        }
    }

    /// Use a custom table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.table_config = config;
        self
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// Resolve a page's resource dictionary, following inheritance from parents.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = self.doc.get_dictionary(page_id).ok();

        while let Some(dict) = node {
            if let Ok(resources) = dict.get(b"Resources") {
                return self.resolve_dict(resources);
            }
            node = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }
        None
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Dictionary(dict) => Some(dict),
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            _ => None,
        }
    }
}

fn open_error(err: lopdf::Error) -> Error {
    match err {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        other => Error::EngineOpen(other.to_string()),
    }
}

impl ContentSource for LopdfBackend {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page_lines(&self, page: u32) -> Result<Vec<TextLine>> {
        let page_id = self.page_id(page)?;
        extract_page_lines(&self.doc, page_id)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", page, e)))
    }

    fn page_images(&self, page: u32) -> Result<Vec<ImageId>> {
        let page_id = self.page_id(page)?;
        let xobjects = match self
            .page_resources(page_id)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| self.resolve_dict(obj))
        {
            Some(xobjects) => xobjects,
            None => return Ok(Vec::new()),
        };

        let mut ids = Vec::new();
        for (_, obj) in xobjects.iter() {
            let id = match obj {
                Object::Reference(id) => *id,
                _ => continue,
            };
            let is_image = self
                .doc
                .get_object(id)
                .and_then(Object::as_stream)
                .and_then(|s| s.dict.get(b"Subtype"))
                .and_then(Object::as_name)
                .map(|name| name == b"Image")
                .unwrap_or(false);
            if is_image && !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn extract_image(&self, id: ImageId) -> Result<RawImage> {
        let stream = self
            .doc
            .get_object(id)
            .and_then(Object::as_stream)
            .map_err(|e| Error::ImageExtract(format!("object {} {}: {}", id.0, id.1, e)))?;
        decode_image_stream(&self.doc, stream)
    }
}

impl TableSource for LopdfBackend {
    fn detect_tables(&self) -> Result<BTreeMap<u32, Vec<RawTable>>> {
        let detector = TableDetector::with_config(self.table_config.clone());
        let mut tables = BTreeMap::new();

        for (&page, &page_id) in &self.pages {
            let spans = extract_page_spans(&self.doc, page_id)
                .map_err(|e| Error::TableExtract(format!("page {}: {}", page, e)))?;
            let grids = detector.detect_grids(&spans);
            if !grids.is_empty() {
                log::debug!("Page {}: {} table candidate(s)", page, grids.len());
                tables.insert(page, grids);
            }
        }

        Ok(tables)
    }
}
