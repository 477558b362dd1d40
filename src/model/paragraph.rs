//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

/// A paragraph of document content.
///
/// Paragraphs are identified by their position in the document's paragraph
/// sequence; block boundaries, caption lookups and duplicate suppression all
/// key off that positional index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Full concatenated text of the paragraph's runs.
    pub text: String,

    /// Ordered formatting runs.
    pub runs: Vec<Run>,

    /// Paragraph style name from the style reference, empty if unstyled.
    pub style_name: String,
}

impl Paragraph {
    /// Create a paragraph from a single unstyled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            runs: vec![Run::new(text.clone())],
            text,
            style_name: String::new(),
        }
    }

    /// Create a paragraph from formatting runs; the paragraph text is the
    /// concatenation of the run texts.
    pub fn from_runs(runs: Vec<Run>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self {
            text,
            runs,
            style_name: String::new(),
        }
    }

    /// Set the paragraph style name.
    pub fn with_style(mut self, style_name: impl Into<String>) -> Self {
        self.style_name = style_name.into();
        self
    }

    /// The paragraph text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Check if the paragraph contains only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A contiguous span of text sharing one formatting state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content. A single-space run is significant to the
    /// formatter and must not be normalized away.
    pub text: String,

    /// Bold flag.
    pub bold: bool,

    /// Italic flag.
    pub italic: bool,

    /// Underline flag.
    pub underline: bool,
}

impl Run {
    /// Create an unstyled run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: true,
            ..Default::default()
        }
    }

    /// Create an underlined run.
    pub fn underline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            underline: true,
            ..Default::default()
        }
    }

    /// Check if any formatting flag is set.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline
    }
}
