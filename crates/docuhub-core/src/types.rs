// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for DocuHub: the tool catalogue, document types, paper
// sizes and page selections.

use serde::{Deserialize, Serialize};

use crate::error::{DocuhubError, Result};

/// Every tool offered on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    PdfMerge,
    DocumentToPdf,
    JpegToPdf,
    PngToPdf,
    PdfCompress,
    PdfSplit,
    PdfProtect,
    PdfRedact,
    MetadataViewer,
    PdfWatermark,
    PdfPageNumbers,
    Ocr,
}

impl ToolId {
    /// All tools in dashboard order.
    pub const ALL: [ToolId; 12] = [
        ToolId::PdfMerge,
        ToolId::DocumentToPdf,
        ToolId::JpegToPdf,
        ToolId::PngToPdf,
        ToolId::PdfCompress,
        ToolId::PdfSplit,
        ToolId::PdfProtect,
        ToolId::PdfRedact,
        ToolId::MetadataViewer,
        ToolId::PdfWatermark,
        ToolId::PdfPageNumbers,
        ToolId::Ocr,
    ];

    /// Stable identifier used in storage keys and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfMerge => "pdf-merge",
            Self::DocumentToPdf => "document-to-pdf",
            Self::JpegToPdf => "jpeg-to-pdf",
            Self::PngToPdf => "png-to-pdf",
            Self::PdfCompress => "pdf-compress",
            Self::PdfSplit => "pdf-split",
            Self::PdfProtect => "pdf-protect",
            Self::PdfRedact => "pdf-redact",
            Self::MetadataViewer => "metadata-viewer",
            Self::PdfWatermark => "pdf-watermark",
            Self::PdfPageNumbers => "pdf-page-numbers",
            Self::Ocr => "ocr",
        }
    }

    /// Parse a stable identifier back into a tool.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == id)
    }

    /// Dashboard title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::PdfMerge => "Merge PDF",
            Self::DocumentToPdf => "Document to PDF",
            Self::JpegToPdf => "JPEG to PDF",
            Self::PngToPdf => "PNG to PDF",
            Self::PdfCompress => "Compress PDF",
            Self::PdfSplit => "Split PDF",
            Self::PdfProtect => "Protect PDF",
            Self::PdfRedact => "Redact PDF",
            Self::MetadataViewer => "Metadata Viewer",
            Self::PdfWatermark => "Watermark PDF",
            Self::PdfPageNumbers => "Add Page Numbers",
            Self::Ocr => "Image to Text (OCR)",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PdfMerge => "Combine PDFs",
            Self::DocumentToPdf => "Convert documents to PDF",
            Self::JpegToPdf => "Convert JPEG images into PDF",
            Self::PngToPdf => "Convert PNG images into PDF",
            Self::PdfCompress => "Reduce file size",
            Self::PdfSplit => "Split pages",
            Self::PdfProtect => "Add password protection",
            Self::PdfRedact => "Remove sensitive information",
            Self::MetadataViewer => "View PDF metadata details",
            Self::PdfWatermark => "Add text watermark to PDF files",
            Self::PdfPageNumbers => "Insert page numbers into PDF",
            Self::Ocr => "Extract text from images",
        }
    }

    /// File extensions (with leading dot) the tool accepts. Empty means any.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Ocr => &[".jpg", ".jpeg", ".png"],
            Self::JpegToPdf => &[".jpg", ".jpeg"],
            Self::PngToPdf => &[".png"],
            Self::DocumentToPdf => &[".txt", ".html", ".htm", ".json", ".docx"],
            Self::PdfMerge
            | Self::PdfSplit
            | Self::PdfProtect
            | Self::PdfRedact
            | Self::PdfCompress
            | Self::PdfWatermark
            | Self::PdfPageNumbers => &[".pdf"],
            Self::MetadataViewer => &[],
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    PlainText,
    Json,
    Html,
    Docx,
    /// Anything else (only the metadata viewer accepts these).
    Other,
}

impl DocumentType {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::PlainText => "text/plain",
            Self::Json => "application/json",
            Self::Html => "text/html",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Other => "application/octet-stream",
        }
    }

    /// Infer document type from file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "txt" => Some(Self::PlainText),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Infer document type from a file name, falling back to `Other`.
    pub fn from_file_name(name: &str) -> Self {
        extension_of(name)
            .and_then(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    /// Whether this is a raster image type.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

/// Lower-cased extension of `name` without the dot, if any.
pub fn extension_of(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Replace the extension of `name` with `.pdf` (`report.docx` → `report.pdf`).
pub fn pdf_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.pdf"),
        _ => format!("{name}.pdf"),
    }
}

/// A contiguous 1-indexed page range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

/// A parsed page selection such as `"2-3"`, `"6"` or `"1,3-5"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelection {
    ranges: Vec<PageRange>,
}

impl PageSelection {
    /// Parse a selection, validating every page against `page_count`.
    pub fn parse(input: &str, page_count: u32) -> Result<Self> {
        let mut ranges = Vec::new();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (parse_page(start)?, parse_page(end)?),
                None => {
                    let page = parse_page(part)?;
                    (page, page)
                }
            };

            if start > end {
                return Err(DocuhubError::InvalidPageRange(format!(
                    "range {start}-{end} runs backwards"
                )));
            }
            if end > page_count {
                return Err(DocuhubError::InvalidPageRange(format!(
                    "page {end} exceeds document page count ({page_count})"
                )));
            }
            ranges.push(PageRange { start, end });
        }

        if ranges.is_empty() {
            return Err(DocuhubError::InvalidPageRange(
                "no pages selected".to_string(),
            ));
        }

        Ok(Self { ranges })
    }

    /// The ranges as written.
    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }

    /// Selected 1-indexed page numbers, ascending and without duplicates.
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .ranges
            .iter()
            .flat_map(|range| range.start..=range.end)
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

fn parse_page(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    let page: u32 = raw
        .parse()
        .map_err(|_| DocuhubError::InvalidPageRange(format!("invalid page number: '{raw}'")))?;
    if page == 0 {
        return Err(DocuhubError::InvalidPageRange(
            "page 0 is invalid (pages start at 1)".to_string(),
        ));
    }
    Ok(page)
}

/// Format a byte count the way the metadata viewer shows it.
pub fn human_size(size: u64) -> String {
    if size < 1024 {
        format!("{size} bytes")
    } else if size < 1024 * 1024 {
        format!("{:.2} KB", size as f64 / 1024.0)
    } else {
        format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
    }
}

/// Parse a compression target such as `"1MB"`, `"500KB"` or a bare byte count.
pub fn parse_size_target(input: &str) -> Option<u64> {
    let trimmed = input.trim().to_ascii_uppercase();
    let (number, multiplier) = if let Some(kb) = trimmed.strip_suffix("KB") {
        (kb, 1024.0)
    } else if let Some(mb) = trimmed.strip_suffix("MB") {
        (mb, 1024.0 * 1024.0)
    } else {
        (trimmed.as_str(), 1.0)
    };
    let value: f64 = number.trim().parse().ok()?;
    if value <= 0.0 || !value.is_finite() {
        return None;
    }
    Some((value * multiplier) as u64)
}
