//! Embedded image extraction.

use crate::error::Result;
use crate::model::ImageRef;
use crate::parser::{ContentSource, ImageFilter};
use crate::pipeline::ExtractionWarning;
use crate::writer::OutputWriter;

/// Images kept on one page, plus the failures that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageImages {
    /// Kept images, in enumeration order
    pub images: Vec<ImageRef>,
    /// One entry per image that could not be extracted or written
    pub warnings: Vec<ExtractionWarning>,
}

/// Pulls a page's embedded images, drops noise, and writes the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageExtractor {
    filter: ImageFilter,
}

impl ImageExtractor {
    /// Create an extractor with the given noise filter.
    pub fn new(filter: ImageFilter) -> Self {
        Self { filter }
    }

    /// Extract and persist the images of `page`.
    ///
    /// Only enumeration failure is returned as an error. A single image that
    /// fails to decode or write is logged and skipped, and numbering of the
    /// kept images continues without a gap.
    pub fn extract_page(
        &self,
        source: &dyn ContentSource,
        page: u32,
        writer: &OutputWriter,
    ) -> Result<PageImages> {
        let mut result = PageImages::default();

        for (i, id) in source.page_images(page)?.into_iter().enumerate() {
            let index = i + 1;

            let raw = match source.extract_image(id) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Page {}: could not extract image {}: {}", page, index, e);
                    result
                        .warnings
                        .push(ExtractionWarning::image(page, index, &e));
                    continue;
                }
            };

            if !self.filter.keeps(raw.byte_size()) {
                log::debug!(
                    "Page {}: dropping image {} ({} bytes)",
                    page,
                    index,
                    raw.byte_size()
                );
                continue;
            }

            let image = ImageRef::new(
                page,
                result.images.len() + 1,
                raw.extension.as_str(),
                raw.byte_size(),
            );
            if let Err(e) = writer.write_image(&image.filename, &raw.data) {
                log::warn!("Page {}: could not write image {}: {}", page, index, e);
                result
                    .warnings
                    .push(ExtractionWarning::image(page, index, &e));
                continue;
            }

            result.images.push(image);
        }

        Ok(result)
    }
}
