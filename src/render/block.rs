//! Block segmentation.
//!
//! A marker line (`#...#`) opens a block that captures the contiguous
//! non-blank paragraphs following it, stopping before the next marker or
//! percent-escape line. The segmenter records captured indices into the
//! consumed set so the pipeline does not render them again as standalone
//! paragraphs.

use std::collections::HashSet;

use log::{debug, trace};

use crate::model::Paragraph;

/// Check whether trimmed paragraph text is a marker line.
pub fn is_marker(trimmed: &str) -> bool {
    trimmed.len() >= 2 && trimmed.starts_with('#') && trimmed.ends_with('#')
}

/// Collapse a percent-escaped marker fragment back into `#...#` form.
///
/// Upstream escaping can wrap a marker into a `%`-prefixed line; the text
/// between the first and second `#` delimiters is re-wrapped so marker
/// detection still fires. Lines without two delimiters pass through.
pub fn collapse_escaped_marker(trimmed: &str) -> String {
    if trimmed.contains('#') && trimmed.starts_with('%') {
        let parts: Vec<&str> = trimmed.split('#').collect();
        if parts.len() >= 3 {
            return format!("#{}#", parts[1]);
        }
    }
    trimmed.to_string()
}

/// Walk forward from a marker and collect the member paragraphs of its
/// block.
///
/// Blank paragraphs inside the span are skipped without ending the walk;
/// the walk stops before a following non-blank paragraph that opens a new
/// marker (`#`) or escape (`%`), or at the end of the document. Captured
/// indices are also recorded into `consumed`.
pub fn collect_block(
    paragraphs: &[Paragraph],
    marker_index: usize,
    consumed: &mut HashSet<usize>,
) -> Vec<usize> {
    let total = paragraphs.len();
    let mut members = Vec::new();

    if marker_index + 1 >= total || paragraphs[marker_index + 1].text.starts_with('#') {
        return members;
    }

    let mut cursor = marker_index;
    loop {
        cursor += 1;
        if cursor >= total {
            break;
        }
        if !paragraphs[cursor].is_blank() {
            members.push(cursor);
            consumed.insert(cursor);
        }
        if cursor >= total - 1 {
            break;
        }
        let next = paragraphs[cursor + 1].trimmed();
        if !next.is_empty() && (next.starts_with('#') || next.starts_with('%')) {
            break;
        }
    }

    debug!(
        "block at paragraph {}: {} member(s)",
        marker_index,
        members.len()
    );
    members
}

/// Tracks marker texts seen during the pass.
///
/// A marker can only open a block while the tracker is idle. The marker
/// text is pushed on open and pushed again whenever it reappears; the list
/// is cleared once it reaches length 3 or once the current paragraph index
/// is already consumed. The length-3 rule is load-bearing for adjacent
/// marker sequences and is kept exactly as-is.
#[derive(Debug, Default)]
pub struct MarkerTracker {
    seen: Vec<String>,
}

impl MarkerTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a new marker may open a block.
    pub fn is_idle(&self) -> bool {
        self.seen.is_empty()
    }

    /// Record a marker opening a block.
    pub fn open(&mut self, marker_lower: &str) {
        trace!("marker opened: {marker_lower}");
        self.seen.push(marker_lower.to_string());
    }

    /// Observe the current paragraph after marker detection ran.
    pub fn observe(&mut self, text_lower: &str, index_consumed: bool) {
        if self.seen.iter().any(|m| m == text_lower) {
            self.seen.push(text_lower.to_string());
        }
        if self.seen.len() >= 3 || index_consumed {
            if !self.seen.is_empty() {
                trace!("marker tracking cleared");
            }
            self.seen.clear();
        }
    }
}
