//! Document-level types.

use serde::{Deserialize, Serialize};

use super::Paragraph;

/// A parsed document: an ordered, read-only paragraph sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Paragraphs in document order. Indices into this vector are stable
    /// for the lifetime of one conversion.
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from a paragraph sequence.
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Total number of runs across all paragraphs.
    pub fn run_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.runs.len()).sum()
    }

    /// Check if the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Plain text of the whole document, one line per paragraph.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Run;

    #[test]
    fn test_counts() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("one"));
        doc.add_paragraph(Paragraph::from_runs(vec![Run::new("two "), Run::bold("three")]));

        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.run_count(), 3);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_plain_text() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("first"),
            Paragraph::with_text("second"),
        ]);
        assert_eq!(doc.plain_text(), "first\nsecond");
    }
}
