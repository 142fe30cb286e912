// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster redaction: render each page to pixels, paint opaque boxes over the
// redacted regions and rebuild the PDF from the images. Nothing of the
// original text layer reaches the output.

use docuhub_core::error::{DocuhubError, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, info, instrument};

use crate::pdf::PdfWriter;
use crate::redact::geometry::{Rectangle, RedactionSet};

/// Fill colour of redaction boxes.
const REDACTION_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Renders pages of one loaded document to pixel buffers.
pub trait PageRasterizer {
    fn page_count(&self) -> u32;

    /// Render a 1-indexed page at `scale` pixels per point.
    fn render_page(&self, page_number: u32, scale: f32) -> Result<RgbaImage>;
}

/// Render one page and paint `rectangles` over it. Rectangles are in buffer
/// pixels and are clipped to the buffer.
pub fn redact_page<R: PageRasterizer + ?Sized>(
    rasterizer: &R,
    page_number: u32,
    rectangles: &[Rectangle],
    scale: f32,
) -> Result<RgbaImage> {
    let mut buffer = rasterizer.render_page(page_number, scale)?;
    for rect in rectangles {
        paint(&mut buffer, rect);
    }
    Ok(buffer)
}

/// Redact every page of the document and rebuild it from images, one page
/// per raster at 1 px = 1 pt. Pages without rectangles are rasterised too.
/// Any page failing to render fails the whole document.
#[instrument(skip_all, fields(pages = rasterizer.page_count(), rectangles = redactions.total(), scale))]
pub fn redact_document<R: PageRasterizer + ?Sized>(
    rasterizer: &R,
    redactions: &RedactionSet,
    scale: f32,
) -> Result<Vec<u8>> {
    let page_count = rasterizer.page_count();
    if page_count == 0 {
        return Err(DocuhubError::RenderError(
            "document has no pages".to_string(),
        ));
    }
    info!(page_count, "Redacting document");

    let mut rasters = Vec::with_capacity(page_count as usize);
    for page_number in 1..=page_count {
        let rectangles = redactions.rectangles(page_number);
        let raster = redact_page(rasterizer, page_number, rectangles, scale).map_err(|err| {
            DocuhubError::RenderError(format!("page {}: {}", page_number, err))
        })?;
        debug!(
            page_number,
            width = raster.width(),
            height = raster.height(),
            painted = rectangles.len(),
            "Page redacted"
        );
        rasters.push(raster);
    }

    let mut writer = PdfWriter::default();
    writer.set_title("Redacted document");
    writer.create_from_rasters(rasters)
}

/// Fill `rect` on the buffer, clipped to its bounds.
fn paint(buffer: &mut RgbaImage, rect: &Rectangle) {
    let (width, height) = (buffer.width() as f32, buffer.height() as f32);
    let left = rect.x.max(0.0).floor();
    let top = rect.y.max(0.0).floor();
    let right = (rect.x + rect.width).min(width).ceil();
    let bottom = (rect.y + rect.height).min(height).ceil();
    if right <= left || bottom <= top {
        return;
    }

    let area = Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32);
    draw_filled_rect_mut(buffer, area, REDACTION_FILL);
}
