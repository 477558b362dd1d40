//! Error types for the undocx library.

use std::io;
use thiserror::Error;

/// Result type alias for undocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during DOCX conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as a DOCX container.
    #[error("Unknown file format: not a valid DOCX container")]
    UnknownFormat,

    /// A required container part is absent (e.g. `word/document.xml`).
    #[error("Invalid or corrupted document: missing part {0}")]
    MissingPart(&'static str),

    /// The container archive is corrupted or unreadable.
    #[error("Corrupted container: {0}")]
    Container(String),

    /// Error reading the WordprocessingML part.
    #[error("XML error: {0}")]
    Xml(String),

    /// The tag configuration is malformed.
    #[error("Invalid tag configuration: {0}")]
    Config(String),

    /// Error extracting media assets from the container.
    #[error("Media extraction error: {0}")]
    MediaExtract(String),

    /// A paragraph failed to render; aborts the whole conversion.
    #[error("Error rendering paragraph {index}: {message}")]
    Paragraph {
        /// Position of the failing paragraph in the document.
        index: usize,
        /// Underlying failure, message preserved verbatim.
        message: String,
    },

    /// Error during rendering not attributable to a single paragraph.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::MissingPart("word/document.xml"),
            _ => Error::Container(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}
