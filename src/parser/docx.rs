//! DOCX container parsing.
//!
//! Flattens WordprocessingML into the paragraph/run data model: `w:p`
//! elements become paragraphs, `w:r` elements become runs with text from
//! their `w:t` children (`w:br`/`w:cr` contribute a newline, `w:tab` a
//! tab), run properties are limited to bold/italic/underline presence, and
//! the paragraph style name comes from `w:pPr/w:pStyle`. Runs inside
//! `w:hyperlink` contribute to the paragraph text but not to its
//! formatting runs, which is what leaves the `<>` placeholder styled
//! blocks splice links into.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::detect;
use crate::error::{Error, Result};
use crate::model::{Document, Paragraph, Run};

use super::{media, ParseOptions};

/// Parser for DOCX containers.
pub struct DocxParser {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    options: ParseOptions,
}

impl DocxParser {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Create a parser from container bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Create a parser from container bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        if !detect::is_docx_bytes(data) {
            return Err(Error::UnknownFormat);
        }
        let archive = ZipArchive::new(Cursor::new(data.to_vec()))?;
        Ok(Self { archive, options })
    }

    /// Parse the main document part into a paragraph stream.
    pub fn parse(&mut self) -> Result<Document> {
        let xml = self.read_document_part()?;
        let doc = parse_document_xml(&xml)?;
        debug!("parsed {} paragraph(s)", doc.paragraph_count());
        Ok(doc)
    }

    /// Extract media assets as ordered data-URI strings.
    ///
    /// Returns an empty sequence when media extraction is disabled or the
    /// container has no media folder. The order matches the container
    /// listing; image rendering consumes it FIFO.
    pub fn extract_media(&mut self) -> Result<Vec<String>> {
        if !self.options.extract_media {
            return Ok(Vec::new());
        }
        media::extract(&mut self.archive, self.options.parallel)
    }

    fn read_document_part(&mut self) -> Result<String> {
        let mut entry = match self.archive.by_name("word/document.xml") {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::MissingPart("word/document.xml"));
            }
            Err(e) => return Err(e.into()),
        };
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        Ok(xml)
    }
}

#[derive(Default)]
struct RunState {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
    in_hyperlink: bool,
}

/// Walk the WordprocessingML event stream and flatten it into paragraphs.
pub(crate) fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<Paragraph> = Vec::new();

    let mut paragraph: Option<Paragraph> = None;
    let mut run: Option<RunState> = None;
    let mut in_ppr = false;
    let mut in_rpr = false;
    let mut in_text = false;
    let mut hyperlink_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    paragraph = Some(Paragraph {
                        text: String::new(),
                        runs: Vec::new(),
                        style_name: String::new(),
                    });
                }
                b"pPr" => in_ppr = true,
                b"rPr" => in_rpr = true,
                b"hyperlink" => hyperlink_depth += 1,
                b"r" if paragraph.is_some() && !in_ppr => {
                    run = Some(RunState {
                        in_hyperlink: hyperlink_depth > 0,
                        ..Default::default()
                    });
                }
                b"t" if run.is_some() => in_text = true,
                b"br" | b"cr" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push('\n');
                    }
                }
                b"tab" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push('\t');
                    }
                }
                b"pStyle" if in_ppr => {
                    if let (Some(p), Some(val)) = (paragraph.as_mut(), val_attribute(&e)?) {
                        p.style_name = val;
                    }
                }
                b"b" | b"i" | b"u" if in_rpr => {
                    set_run_flag(&mut run, e.local_name().as_ref());
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(Paragraph {
                    text: String::new(),
                    runs: Vec::new(),
                    style_name: String::new(),
                }),
                b"br" | b"cr" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push('\n');
                    }
                }
                b"tab" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push('\t');
                    }
                }
                b"pStyle" if in_ppr => {
                    if let (Some(p), Some(val)) = (paragraph.as_mut(), val_attribute(&e)?) {
                        p.style_name = val;
                    }
                }
                b"b" | b"i" | b"u" if in_rpr => {
                    set_run_flag(&mut run, e.local_name().as_ref());
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    if let Some(r) = run.as_mut() {
                        r.text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(p) = paragraph.take() {
                        paragraphs.push(p);
                    }
                }
                b"pPr" => in_ppr = false,
                b"rPr" => in_rpr = false,
                b"hyperlink" => hyperlink_depth = hyperlink_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"r" => {
                    if let (Some(p), Some(r)) = (paragraph.as_mut(), run.take()) {
                        p.text.push_str(&r.text);
                        if !r.in_hyperlink {
                            p.runs.push(Run {
                                text: r.text,
                                bold: r.bold,
                                italic: r.italic,
                                underline: r.underline,
                            });
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Document::from_paragraphs(paragraphs))
}

fn set_run_flag(run: &mut Option<RunState>, name: &[u8]) {
    if let Some(r) = run.as_mut() {
        match name {
            b"b" => r.bold = true,
            b"i" => r.italic = true,
            b"u" => r.underline = true,
            _ => {}
        }
    }
}

/// Read the `w:val` attribute of an element, matching by local name.
fn val_attribute(element: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"val" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
