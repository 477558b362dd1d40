//! Integration tests for DOCX container parsing and full-file conversion.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use undocx::{convert_bytes, parse_bytes, DocxParser, Error, TagConfig, Undocx};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

/// Build an in-memory DOCX with the given document body and media files.
fn build_docx(body: &str, media: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = ZipWriter::new(Cursor::new(&mut buf));
        let options = FileOptions::default();

        writer.start_file("word/document.xml", options).unwrap();
        let xml = format!("{XML_HEADER}<w:document {NS}><w:body>{body}</w:body></w:document>");
        writer.write_all(xml.as_bytes()).unwrap();

        for (name, data) in media {
            writer
                .start_file(format!("word/media/{name}"), options)
                .unwrap();
            writer.write_all(data).unwrap();
        }

        writer.finish().unwrap();
    }
    buf
}

fn simple_paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

#[test]
fn parse_bytes_yields_paragraph_stream() {
    let body = format!(
        "{}{}",
        simple_paragraph("Primeiro parágrafo"),
        simple_paragraph("Segundo parágrafo"),
    );
    let data = build_docx(&body, &[]);

    let doc = parse_bytes(&data).unwrap();
    assert_eq!(doc.paragraph_count(), 2);
    assert_eq!(doc.paragraphs[0].text, "Primeiro parágrafo");
    assert_eq!(doc.paragraphs[1].text, "Segundo parágrafo");
}

#[test]
fn missing_document_part_is_input_missing_error() {
    let mut buf = Vec::new();
    {
        let mut writer = ZipWriter::new(Cursor::new(&mut buf));
        writer
            .start_file("word/styles.xml", FileOptions::default())
            .unwrap();
        writer.write_all(b"<styles/>").unwrap();
        writer.finish().unwrap();
    }

    let err = parse_bytes(&buf).unwrap_err();
    assert!(matches!(err, Error::MissingPart("word/document.xml")));
}

#[test]
fn non_container_bytes_are_rejected() {
    let err = parse_bytes(b"plain text, not a zip").unwrap_err();
    assert!(matches!(err, Error::UnknownFormat));
}

#[test]
fn media_assets_surface_as_ordered_data_uris() {
    let data = build_docx(
        &simple_paragraph("x"),
        &[("image1.png", b"PNGDATA"), ("image2.jpg", b"JPGDATA")],
    );

    let mut parser = DocxParser::from_bytes(&data).unwrap();
    let media = parser.extract_media().unwrap();
    assert_eq!(media.len(), 2);
    assert!(media[0].starts_with("data:image/png;base64,"));
    assert!(media[1].starts_with("data:image/jpeg;base64,"));
}

#[test]
fn convert_bytes_consumes_container_media() {
    let body = format!(
        "{}{}{}",
        simple_paragraph("Figura 1: uma casa"),
        simple_paragraph("Fonte: o autor"),
        simple_paragraph("depois da figura"),
    );
    let data = build_docx(&body, &[("image1.png", b"PNGDATA")]);

    let out = convert_bytes(&data, &TagConfig::builtin()).unwrap();
    assert!(out.contains("T-FIGURA"));
    assert!(out.contains("data:image/png;base64,"));
    assert!(out.contains("\"titulo\":\"uma casa\""));
    assert!(out.contains("\"fonte\":\"o autor\""));
    // The caption paragraph is part of the figure, not standalone output.
    assert!(!out.contains("<p style=\"text-align: justify;\">Fonte: o autor</p>"));
}

#[test]
fn convert_full_document_with_block_and_formatting() {
    let body = format!(
        "{}{}{}{}",
        simple_paragraph("#Dica#"),
        "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>texto forte</w:t></w:r></w:p>",
        simple_paragraph("membro simples"),
        simple_paragraph("parágrafo final"),
    );
    let data = build_docx(&body, &[]);

    let out = convert_bytes(&data, &TagConfig::builtin()).unwrap();
    assert!(out.contains("B-DICA"));
    assert!(out.contains("%3Cstrong%3Etexto forte%3C/strong%3E"));
    assert!(out.contains("membro simples"));
}

#[test]
fn builder_without_media_uses_placeholder() {
    let body = format!(
        "{}{}",
        simple_paragraph("Figura 1: casa"),
        simple_paragraph("Fonte: autor"),
    );
    let data = build_docx(&body, &[("image1.png", b"PNGDATA")]);

    let result = Undocx::new().without_media().parse_bytes(&data).unwrap();
    assert!(result.media.is_empty());
    let out = result.to_ebook().unwrap();
    assert!(out.contains("https://i.pinimg.com/"));
}

#[test]
fn convert_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.docx");
    std::fs::write(&path, build_docx(&simple_paragraph("um texto"), &[])).unwrap();

    let out = undocx::convert_file(&path, &TagConfig::empty()).unwrap();
    assert_eq!(out, "<p style=\"text-align: justify;\">um texto</p>");
}
