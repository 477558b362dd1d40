//! # undocx
//!
//! Converts a word-processing document's paragraph stream into the flat
//! tagged-markup text consumed by an e-book authoring platform.
//!
//! The conversion is driven by an ordered tag configuration: marker lines
//! (`#...#`) open blocks of paragraphs, each block or paragraph is matched
//! against the configured rules, inline formatting renders into a
//! percent-encoded markup dialect, and embedded `{{...}}` formulas expand
//! into nested superscript/subscript markup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use undocx::{convert_file, TagConfig};
//!
//! fn main() -> undocx::Result<()> {
//!     let config = TagConfig::builtin();
//!     let text = convert_file("apostila.docx", &config)?;
//!     std::fs::write("apostila.txt", text)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Configurable tag vocabulary**: ordered rules with block, single,
//!   image and title behaviors
//! - **Quote-aware inline formatting**: alternating curly quotes threaded
//!   across each block
//! - **Formula expansion**: `a^2+b^2=c^2` style notation to `<sup>`/`<sub>`
//! - **Media extraction**: container images as ordered data URIs, consumed
//!   FIFO by image tags

pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use config::{
    BlockMode, BlockOptions, ImageOptions, SingleAction, TagBehavior, TagConfig, TagMatcher,
    TagRule, TitleStyle,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, is_docx_bytes};
pub use error::{Error, Result};
pub use model::{Document, Paragraph, Run};
pub use parser::{DocxParser, ParseOptions};
pub use render::{to_ebook, to_ebook_lines, EbookRenderer};

use std::path::Path;

/// Parse a DOCX file and return its paragraph stream.
///
/// # Example
///
/// ```no_run
/// use undocx::parse_file;
///
/// let doc = parse_file("apostila.docx").unwrap();
/// println!("Paragraphs: {}", doc.paragraph_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let mut parser = DocxParser::open(path)?;
    parser.parse()
}

/// Parse a DOCX from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let mut parser = DocxParser::from_bytes(data)?;
    parser.parse()
}

/// Convert a DOCX file to the tagged-output text.
pub fn convert_file<P: AsRef<Path>>(path: P, config: &TagConfig) -> Result<String> {
    let data = std::fs::read(path)?;
    convert_bytes(&data, config)
}

/// Convert DOCX bytes to the tagged-output text.
///
/// Media assets are fully materialized before the text pass begins, since
/// image rendering consumes them with strict FIFO semantics.
pub fn convert_bytes(data: &[u8], config: &TagConfig) -> Result<String> {
    let mut parser = DocxParser::from_bytes(data)?;
    let media = parser.extract_media()?;
    let doc = parser.parse()?;
    render::to_ebook(&doc, config, media)
}

/// Builder for parsing and converting DOCX documents.
///
/// # Example
///
/// ```no_run
/// use undocx::Undocx;
///
/// let text = Undocx::new()
///     .without_media()
///     .parse("apostila.docx")?
///     .to_ebook()?;
/// # Ok::<(), undocx::Error>(())
/// ```
pub struct Undocx {
    parse_options: ParseOptions,
    config: TagConfig,
}

impl Undocx {
    /// Create a new builder with the builtin tag vocabulary.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            config: TagConfig::builtin(),
        }
    }

    /// Use a custom tag configuration.
    pub fn with_config(mut self, config: TagConfig) -> Self {
        self.config = config;
        self
    }

    /// Skip media extraction; image tags fall back to the placeholder.
    pub fn without_media(mut self) -> Self {
        self.parse_options = self.parse_options.with_media(false);
        self
    }

    /// Disable parallel media encoding.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Parse a DOCX file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UndocxResult> {
        let data = std::fs::read(path)?;
        self.parse_bytes(&data)
    }

    /// Parse a DOCX from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<UndocxResult> {
        let mut parser = DocxParser::from_bytes_with_options(data, self.parse_options)?;
        let media = parser.extract_media()?;
        let document = parser.parse()?;
        Ok(UndocxResult {
            document,
            media,
            config: self.config,
        })
    }
}

impl Default for Undocx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a DOCX document, ready for rendering.
pub struct UndocxResult {
    /// The parsed paragraph stream.
    pub document: Document,
    /// Extracted media assets in container order.
    pub media: Vec<String>,
    config: TagConfig,
}

impl UndocxResult {
    /// Render the tagged-output text.
    pub fn to_ebook(&self) -> Result<String> {
        render::to_ebook(&self.document, &self.config, self.media.clone())
    }

    /// Render the ordered output line sequence.
    pub fn to_lines(&self) -> Result<Vec<String>> {
        render::to_ebook_lines(&self.document, &self.config, self.media.clone())
    }

    /// Get the parsed document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = Undocx::new();
        assert!(builder.parse_options.extract_media);
        assert!(!builder.config.tags.is_empty());
    }

    #[test]
    fn test_builder_chained() {
        let builder = Undocx::new()
            .with_config(TagConfig::empty())
            .without_media()
            .sequential();
        assert!(!builder.parse_options.extract_media);
        assert!(!builder.parse_options.parallel);
        assert!(builder.config.tags.is_empty());
    }

    #[test]
    fn test_parse_bytes_rejects_non_container() {
        assert!(matches!(
            parse_bytes(b"not a container"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_parse_bytes_empty_data() {
        let data: [u8; 0] = [];
        assert!(parse_bytes(&data).is_err());
    }
}
