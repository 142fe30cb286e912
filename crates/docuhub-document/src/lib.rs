// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docuhub-document — Document operations for the DocuHub toolkit.
//
// Provides PDF operations (merge, split, compress, protect, watermark, page
// numbers, metadata), PDF creation from text and images, text layout, raster
// redaction, text extraction from TXT/JSON/HTML/DOCX, image storage
// compression and OCR.

pub mod convert;
pub mod extract;
pub mod image;
pub mod layout;
pub mod pdf;
pub mod redact;

#[cfg(feature = "ocr")]
pub mod ocr;

// Re-export the primary entry points so callers can use `docuhub_document::PdfReader` etc.
pub use convert::{ConvertedPdf, DocumentConverter};
pub use extract::extract_text;
pub use image::{ImageProcessor, compress_for_storage};
pub use layout::{StandardFontMetrics, TextMeasure, layout_text, paginate, wrap};
pub use pdf::{
    CompressionOutcome, CompressionReport, PdfReader, PdfWriter, add_page_numbers, add_watermark,
    compress, merge, protect,
};
pub use redact::{PageRasterizer, Rectangle, RedactionSet, redact_document};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};

#[cfg(feature = "render")]
pub use redact::{PdfiumRasterizer, bind_pdfium};
