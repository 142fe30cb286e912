// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction — rectangle editing and the raster compositor.

pub mod compositor;
pub mod geometry;

#[cfg(feature = "render")]
pub mod pdfium;

pub use compositor::{PageRasterizer, redact_document, redact_page};
pub use geometry::{Point, Rectangle, RectangleDraft, RedactionSet, erase};

#[cfg(feature = "render")]
pub use pdfium::{PdfiumRasterizer, bind_pdfium};
