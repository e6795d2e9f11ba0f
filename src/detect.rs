//! PDF header sniffing.
//!
//! Run before the engine opens a file so that a wrong input (an HTML page
//! saved as `.pdf`, a truncated download) fails fast with a clear error.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF format information read from the file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"
/// Readers accept the header anywhere in the first 1024 bytes.
const HEADER_LEN: u64 = 1024;

/// Detect PDF format from a file path.
///
/// A missing file is reported as [`Error::InputNotFound`] rather than a bare
/// I/O error.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::InputNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.take(HEADER_LEN).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect PDF format from the leading bytes of a file.
///
/// The `%PDF-` marker may follow leading junk, such as a mail or HTTP
/// preamble, as long as it starts within the first 1024 bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_LEN as usize)];
    let start = window
        .windows(PDF_MAGIC_LEN)
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;
    let data = &data[start..];
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    if start > 0 {
        log::debug!("PDF header found at offset {}", start);
    }
    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

fn is_valid_version(version: &str) -> bool {
    let chars: Vec<char> = version.chars().collect();
    chars.len() == 3 && chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_format_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));

        let result = detect_format_from_bytes(b"%PDF");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_header_after_junk() {
        let mut data = vec![0u8; 600];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert_eq!(detect_format_from_bytes(&data).unwrap().version, "1.4");

        let mut late = vec![b' '; 1020];
        late.extend_from_slice(b"%PDF-1.4\n");
        assert!(matches!(
            detect_format_from_bytes(&late),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_path_with_preamble() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailed.pdf");
        std::fs::write(&path, b"Content-Type: application/pdf\r\n\r\n%PDF-1.6\n").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap().version, "1.6");
    }

    #[test]
    fn test_detect_bad_version() {
        let result = detect_format_from_bytes(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(_))));
    }

    #[test]
    fn test_detect_missing_file() {
        let result = detect_format_from_path("definitely/not/here.pdf");
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_detect_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.pdf");
        std::fs::write(&path, b"%PD").unwrap();
        assert!(matches!(
            detect_format_from_path(&path),
            Err(Error::UnknownFormat)
        ));
    }
}
