//! References to extracted images.

use serde::{Deserialize, Serialize};

/// Directory, relative to the output root, that holds extracted images.
pub const IMAGE_DIR: &str = "images";

/// Pointer to an image persisted under `images/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// File name, `page{N}_img{K}.{ext}`
    pub filename: String,

    /// Path relative to the output root
    #[serde(rename = "path")]
    pub relative_path: String,

    /// File extension of the stored bytes (e.g. "jpeg", "png")
    #[serde(rename = "type")]
    pub format: String,

    /// Size of the stored bytes
    #[serde(rename = "size")]
    pub byte_size: usize,
}

impl ImageRef {
    /// Build the reference for the `index`-th kept image (1-indexed) on `page`.
    pub fn new(page: u32, index: usize, format: impl Into<String>, byte_size: usize) -> Self {
        let format = format.into();
        let filename = image_filename(page, index, &format);
        Self {
            relative_path: format!("{}/{}", IMAGE_DIR, filename),
            filename,
            format,
            byte_size,
        }
    }
}

/// File name for the `index`-th kept image on `page`.
pub fn image_filename(page: u32, index: usize, extension: &str) -> String {
    format!("page{}_img{}.{}", page, index, extension)
}
