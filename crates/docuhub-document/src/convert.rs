// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion of accepted input documents to PDF.
//
// Text-bearing formats (TXT, JSON, HTML, DOCX) are extracted to plain text
// and laid out on fixed-size pages; images become a single page sized to
// their pixel dimensions.

use docuhub_core::config::TextLayoutConfig;
use docuhub_core::error::{DocuhubError, Result};
use docuhub_core::types::{DocumentType, pdf_file_name};
use tracing::{debug, info, instrument};

use crate::extract::extract_text;
use crate::pdf::writer::PdfWriter;

/// A converted document ready to be written out.
#[derive(Debug, Clone)]
pub struct ConvertedPdf {
    /// Output file name (`report.docx` → `report.pdf`).
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Converts documents and images to PDF.
pub struct DocumentConverter {
    writer: PdfWriter,
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self::new(TextLayoutConfig::default())
    }
}

impl DocumentConverter {
    pub fn new(layout: TextLayoutConfig) -> Self {
        Self {
            writer: PdfWriter::new(layout),
        }
    }

    /// Convert `data` (named `name`) to PDF. The input type is taken from the
    /// extension.
    #[instrument(skip(self, data), fields(bytes_len = data.len()))]
    pub fn to_pdf(&self, name: &str, data: &[u8]) -> Result<ConvertedPdf> {
        let source = DocumentType::from_file_name(name);
        info!(from = source.mime_type(), "Converting to PDF");

        let bytes = match source {
            DocumentType::PlainText
            | DocumentType::Json
            | DocumentType::Html
            | DocumentType::Docx => {
                let text = extract_text(name, data)?;
                self.writer.create_from_text(&text)?
            }
            DocumentType::Jpeg | DocumentType::Png => self.writer.create_from_image(data)?,
            DocumentType::Pdf | DocumentType::Other => {
                return Err(DocuhubError::UnsupportedDocument(format!(
                    "no PDF conversion for {} ({})",
                    name,
                    source.mime_type()
                )));
            }
        };

        let file_name = pdf_file_name(name);
        debug!(file_name = %file_name, output_len = bytes.len(), "Conversion complete");
        Ok(ConvertedPdf { file_name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn text_converts_with_renamed_output() {
        let converted = DocumentConverter::default()
            .to_pdf("notes.txt", b"some words to lay out")
            .unwrap();
        assert_eq!(converted.file_name, "notes.pdf");
        assert!(converted.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn png_converts_to_single_page() {
        let mut png = Vec::new();
        RgbImage::from_pixel(40, 30, Rgb([200, 10, 10]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let converted = DocumentConverter::default().to_pdf("photo.png", &png).unwrap();
        let doc = lopdf::Document::load_mem(&converted.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(converted.file_name, "photo.pdf");
    }

    #[test]
    fn pdf_input_is_rejected() {
        assert!(matches!(
            DocumentConverter::default().to_pdf("a.pdf", b"%PDF-1.7"),
            Err(DocuhubError::UnsupportedDocument(_))
        ));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(
            DocumentConverter::default().to_pdf("blank.txt", b"   "),
            Err(DocuhubError::EmptyDocument(_))
        ));
    }
}
