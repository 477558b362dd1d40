//! Document pipeline.
//!
//! Drives one full pass over the paragraph sequence: block segmentation,
//! tag matching and rendering, plain-paragraph fallback, and output
//! assembly with adjacent-duplicate suppression. All mutable state lives
//! on the renderer instance and is scoped to one conversion; a renderer is
//! consumed by its pass and never reused.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};
use regex::Regex;

use crate::config::{TagBehavior, TagConfig, TagRule};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::render::block::{self, MarkerTracker};
use crate::render::markup::SeamNormalizer;
use crate::render::{formula, inline, tag};

/// Convert a parsed document to the tagged-output text, lines joined with
/// newlines.
pub fn to_ebook(doc: &Document, config: &TagConfig, media: Vec<String>) -> Result<String> {
    Ok(to_ebook_lines(doc, config, media)?.join("\n"))
}

/// Convert a parsed document to the ordered output line sequence.
pub fn to_ebook_lines(
    doc: &Document,
    config: &TagConfig,
    media: Vec<String>,
) -> Result<Vec<String>> {
    EbookRenderer::new(config, doc, media).render_lines()
}

/// Output of rendering one paragraph.
enum Rendered {
    /// Nothing to append.
    None,
    /// A single output line.
    One(String),
    /// One fragment per embedded paragraph break.
    Many(Vec<String>),
}

/// One conversion pass. Not reentrant; create a new renderer per document.
pub struct EbookRenderer<'a> {
    config: &'a TagConfig,
    doc: &'a Document,
    /// Extracted media assets, consumed FIFO by image tags.
    media: VecDeque<String>,
    /// Paragraph indices already rendered as part of some block.
    consumed: HashSet<usize>,
    tracker: MarkerTracker,
    formula_re: Regex,
}

impl<'a> EbookRenderer<'a> {
    /// Create a renderer for one document.
    ///
    /// `media` must already be fully materialized in container order;
    /// image rendering consumes it front-first.
    pub fn new(config: &'a TagConfig, doc: &'a Document, media: Vec<String>) -> Self {
        Self {
            config,
            doc,
            media: media.into(),
            consumed: HashSet::new(),
            tracker: MarkerTracker::new(),
            formula_re: formula::slot_regex(),
        }
    }

    /// Run the full pass and join the output lines.
    pub fn render(self) -> Result<String> {
        Ok(self.render_lines()?.join("\n"))
    }

    /// Run the full pass.
    pub fn render_lines(mut self) -> Result<Vec<String>> {
        let doc = self.doc;
        let total = doc.paragraphs.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        debug!("rendering document with {total} paragraph(s)");

        let mut lines: Vec<String> = Vec::new();
        for index in 0..total {
            let trimmed = block::collapse_escaped_marker(doc.paragraphs[index].trimmed());
            let lower = trimmed.to_lowercase();

            let mut members: Vec<usize> = Vec::new();
            if block::is_marker(&trimmed) && index < total - 1 && self.tracker.is_idle() {
                self.tracker.open(&lower);
                members = block::collect_block(&doc.paragraphs, index, &mut self.consumed);
            }

            self.tracker.observe(&lower, self.consumed.contains(&index));

            let rendered = self
                .render_paragraph(index, &trimmed, &lower, &members)
                .map_err(|e| Error::Paragraph {
                    index,
                    message: e.to_string(),
                })?;

            match rendered {
                Rendered::None => {}
                Rendered::One(line) => push_line(&mut lines, line),
                Rendered::Many(fragments) => {
                    for fragment in fragments {
                        push_line(&mut lines, fragment);
                    }
                }
            }
        }
        Ok(lines)
    }

    fn render_paragraph(
        &mut self,
        index: usize,
        trimmed: &str,
        lower: &str,
        members: &[usize],
    ) -> Result<Rendered> {
        if self.consumed.contains(&index) {
            trace!("paragraph {index} already consumed by a block");
            return Ok(Rendered::None);
        }

        let config = self.config;
        for rule in &config.tags {
            if let Some(matched) = tag::match_pattern(&rule.matcher, trimmed) {
                debug!("paragraph {index} matched tag '{}'", rule.name);
                if let Some(output) =
                    self.render_rule(rule, matched, index, trimmed, lower, members)?
                {
                    return Ok(Rendered::One(output));
                }
            }
        }

        Ok(self.render_plain(index))
    }

    fn render_rule(
        &mut self,
        rule: &TagRule,
        matched: &str,
        index: usize,
        trimmed: &str,
        lower: &str,
        members: &[usize],
    ) -> Result<Option<String>> {
        match &rule.behavior {
            TagBehavior::Block(options) => Ok(Some(tag::render_block(
                options,
                &rule.output_template,
                self.doc,
                members,
                lower,
            ))),
            TagBehavior::Single(action) => {
                tag::render_single(*action, &rule.output_template, trimmed, matched)
            }
            TagBehavior::Image(options) => {
                match tag::render_image(
                    options,
                    &rule.output_template,
                    self.doc,
                    index,
                    &mut self.media,
                ) {
                    Some((output, caption_index)) => {
                        // The caption paragraph belongs to the figure.
                        self.consumed.insert(caption_index);
                        Ok(Some(output))
                    }
                    None => Ok(None),
                }
            }
            TagBehavior::Title(style) => Ok(Some(tag::render_title(
                *style,
                &rule.output_template,
                trimmed,
            ))),
        }
    }

    /// Plain-content fallback for paragraphs no rule matched.
    fn render_plain(&self, index: usize) -> Rendered {
        let paragraph = &self.doc.paragraphs[index];
        let mut text = inline::format_plain_runs(&paragraph.runs);

        if paragraph.style_name.starts_with("List") {
            text = format!("<li style=\"text-align: justify;\">{text}<br/><br/></li>");
        } else if !text.trim().is_empty() {
            text = format!("<p style=\"text-align: justify;\">{text}</p>");
        } else {
            text = format!("<p>{text}</p>");
        }

        text = text.replace('\n', "</p>|<p style=\"text-align: justify;\">");
        text = SeamNormalizer::PLAIN.normalize(&text);
        text = formula::expand_embedded(&text, &self.formula_re);

        if text.contains("</p>|<p") {
            let fragments = text
                .split('|')
                .map(|fragment| {
                    fragment.replace("<p style=\"text-align: justify;\"></p>", "<p></p>")
                })
                .collect();
            return Rendered::Many(fragments);
        }

        if text == "<p></p>" || text == "<p> </p>" {
            Rendered::None
        } else {
            Rendered::One(text)
        }
    }
}

/// Append a fragment unless it is empty, a bare empty-paragraph
/// placeholder, or identical to the immediately preceding line.
fn push_line(lines: &mut Vec<String>, line: String) {
    if line.is_empty() || line == "<p></p>" {
        return;
    }
    if lines.last().is_some_and(|last| last == &line) {
        return;
    }
    lines.push(line);
}
