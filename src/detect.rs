//! Format detection for DOCX containers.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic bytes of a ZIP local file header, shared by all OOXML containers.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Detected container format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Whether the container starts with a ZIP local file header.
    pub zip_container: bool,
}

/// Detect the container format from raw bytes.
///
/// Returns an error if the data is too short or does not carry the
/// ZIP magic. Whether `word/document.xml` is actually present is only
/// known after opening the archive; see [`crate::parser::DocxParser`].
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if data.len() < ZIP_MAGIC.len() || &data[..ZIP_MAGIC.len()] != ZIP_MAGIC {
        return Err(Error::UnknownFormat);
    }
    Ok(DocxFormat {
        zip_container: true,
    })
}

/// Detect the container format by reading the start of a file.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 4];
    let n = file.read(&mut header)?;
    detect_format_from_bytes(&header[..n])
}

/// Check whether raw bytes look like a DOCX container.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Check whether a file looks like a DOCX container.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}
