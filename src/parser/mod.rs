//! PDF parsing module.

mod backend;
mod image_decode;
mod layout;
mod options;
mod table_detector;

pub use backend::{ContentSource, ImageId, LopdfBackend, TableSource};
pub use image_decode::{decode_image_stream, encode_png, RawImage};
pub use layout::{
    extract_page_lines, extract_page_spans, group_spans_into_lines, merge_style_runs,
    page_content, TextLine, TextSpan,
};
pub use options::{ClassifierConfig, ErrorMode, ExtractOptions, ImageFilter, DEFAULT_MATH_PATTERN};
pub use table_detector::{to_grid, DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
