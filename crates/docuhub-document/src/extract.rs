// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text extraction from the document formats accepted by the
// document-to-PDF tool: text, JSON, HTML and DOCX.

use std::io::{Cursor, Read};

use docuhub_core::error::{DocuhubError, Result};
use docuhub_core::types::DocumentType;
use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements after which a line break is emitted.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote",
    "section", "article", "header", "footer", "table", "ul", "ol",
];

const DOCX_BODY: &str = "word/document.xml";

/// Extract readable text from `data`, dispatching on the file name's
/// extension. Fails with `EmptyDocument` when nothing but whitespace is left.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn extract_text(name: &str, data: &[u8]) -> Result<String> {
    let text = match DocumentType::from_file_name(name) {
        DocumentType::PlainText | DocumentType::Json => {
            String::from_utf8_lossy(data).into_owned()
        }
        DocumentType::Html => html_text(&String::from_utf8_lossy(data)),
        DocumentType::Docx => docx_text(data)?,
        other => {
            return Err(DocuhubError::UnsupportedDocument(format!(
                "cannot extract text from {} ({})",
                name,
                other.mime_type()
            )));
        }
    };

    if text.trim().is_empty() {
        return Err(DocuhubError::EmptyDocument(name.to_string()));
    }
    debug!(chars = text.chars().count(), "text extracted");
    Ok(text)
}

/// Visible text of an HTML document, one line per block element.
pub fn html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_visible(document.root_element(), &mut out);
    out
}

fn collect_visible(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let fragment = text.trim();
            if !fragment.is_empty() {
                if !out.is_empty() && !out.ends_with(['\n', ' ']) {
                    out.push(' ');
                }
                out.push_str(fragment);
            }
            continue;
        }

        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if HIDDEN_ELEMENTS.contains(&name) {
            continue;
        }
        collect_visible(child, out);
        if BLOCK_ELEMENTS.contains(&name) && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}

/// Paragraph text of a DOCX package: the runs of `word/document.xml`, one
/// line per paragraph.
pub fn docx_text(data: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| DocuhubError::ExtractionError(format!("not a DOCX package: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| DocuhubError::ExtractionError(format!("missing {}: {}", DOCX_BODY, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| DocuhubError::ExtractionError(format!("failed to read {}: {}", DOCX_BODY, e)))?;

    word_xml_text(&xml)
}

fn word_xml_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| DocuhubError::ExtractionError(format!("bad DOCX text: {}", e)))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocuhubError::ExtractionError(format!(
                    "malformed DOCX XML at {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn plain_text_and_json_pass_through() {
        assert_eq!(extract_text("a.txt", b"hello world").unwrap(), "hello world");
        assert_eq!(extract_text("a.json", br#"{"k": 1}"#).unwrap(), r#"{"k": 1}"#);
    }

    #[test]
    fn html_keeps_visible_text_only() {
        let html = "<html><head><title>T</title><style>p{}</style></head>\
                    <body><h1>Title</h1><p>First <b>bold</b> para</p>\
                    <script>var x = 1;</script><p>Second</p></body></html>";
        let text = extract_text("page.html", html.as_bytes()).unwrap();
        assert_eq!(text, "Title\nFirst bold para\nSecond\n");
    }

    #[test]
    fn docx_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
<w:p><w:r><w:t>A</w:t><w:tab/><w:t>B &amp; C</w:t></w:r></w:p>
</w:body></w:document>"#;
        let text = extract_text("letter.docx", &docx(xml)).unwrap();
        assert_eq!(text, "Hello world\nA\tB & C\n");
    }

    #[test]
    fn blank_documents_are_rejected() {
        assert!(matches!(
            extract_text("empty.txt", b"  \n\t "),
            Err(DocuhubError::EmptyDocument(_))
        ));
        let xml = r#"<w:document xmlns:w="x"><w:body><w:p/></w:body></w:document>"#;
        assert!(matches!(
            extract_text("empty.docx", &docx(xml)),
            Err(DocuhubError::EmptyDocument(_))
        ));
    }

    #[test]
    fn broken_docx_is_an_extraction_error() {
        assert!(matches!(
            extract_text("x.docx", b"not a zip"),
            Err(DocuhubError::ExtractionError(_))
        ));
    }

    #[test]
    fn other_types_are_unsupported() {
        assert!(matches!(
            extract_text("scan.pdf", b"%PDF-1.7"),
            Err(DocuhubError::UnsupportedDocument(_))
        ));
    }
}
