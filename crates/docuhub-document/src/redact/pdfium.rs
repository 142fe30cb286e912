// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFium-backed page rasteriser.
//
// # Feature Gate
//
// Only available with the `render` feature. The PDFium shared library is
// looked up next to the executable first, then on the system library path.

use docuhub_core::error::{DocuhubError, Result};
use image::RgbaImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};

use crate::redact::compositor::PageRasterizer;

/// Bind the PDFium library.
pub fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|err| DocuhubError::RenderError(format!("failed to bind pdfium: {}", err)))?;
    info!("PDFium bound");
    Ok(Pdfium::new(bindings))
}

/// Rasterises pages of one loaded document.
pub struct PdfiumRasterizer<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumRasterizer<'a> {
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn load(pdfium: &'a Pdfium, data: &'a [u8]) -> Result<Self> {
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|err| DocuhubError::RenderError(format!("failed to load PDF: {}", err)))?;
        debug!(pages = document.pages().len(), "PDF loaded for rendering");
        Ok(Self { document })
    }
}

impl PageRasterizer for PdfiumRasterizer<'_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn render_page(&self, page_number: u32, scale: f32) -> Result<RgbaImage> {
        let index = page_number
            .checked_sub(1)
            .and_then(|index| u16::try_from(index).ok())
            .ok_or_else(|| DocuhubError::RenderError(format!("no page {}", page_number)))?;

        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|err| DocuhubError::RenderError(format!("no page {}: {}", page_number, err)))?;

        let width = (page.width().value * scale).round() as i32;
        let height = (page.height().value * scale).round() as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|err| {
                DocuhubError::RenderError(format!("failed to render page {}: {}", page_number, err))
            })?;

        Ok(bitmap.as_image().to_rgba8())
    }
}
