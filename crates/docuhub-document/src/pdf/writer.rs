// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — create new PDF documents from laid-out text, images, or
// rendered page rasters using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use docuhub_core::config::TextLayoutConfig;
use docuhub_core::error::{DocuhubError, Result};
use image::{DynamicImage, RgbaImage};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::layout::{Pagination, StandardFontMetrics, layout_text};

/// Images are placed at 72 dpi so one pixel covers one point.
const POINT_DPI: f32 = 72.0;

fn pt_to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// Creates new PDF documents from text content or raster images.
pub struct PdfWriter {
    layout: TextLayoutConfig,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(TextLayoutConfig::default())
    }
}

impl PdfWriter {
    pub fn new(layout: TextLayoutConfig) -> Self {
        Self {
            layout,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn layout(&self) -> &TextLayoutConfig {
        &self.layout
    }

    fn title_or(&self, fallback: &'static str) -> &str {
        self.title.as_deref().unwrap_or(fallback)
    }

    // -- Text to PDF ----------------------------------------------------------

    /// Lay out plain text in Helvetica and render it.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn create_from_text(&self, text: &str) -> Result<Vec<u8>> {
        let metrics = StandardFontMetrics::helvetica(self.layout.font_size);
        let pagination = layout_text(text, &metrics, &self.layout);
        self.create_from_layout(&pagination)
    }

    /// Render already paginated lines. Each page starts its first baseline
    /// one margin below the top edge; baselines step down by the line pitch.
    pub fn create_from_layout(&self, pagination: &Pagination) -> Result<Vec<u8>> {
        let layout = &self.layout;
        let title = self.title_or("DocuHub Document");
        info!(pages = pagination.pages.len(), title, "Creating text PDF");

        let page_w = pt_to_mm(layout.page_width);
        let page_h = pt_to_mm(layout.page_height);
        let pitch = layout.line_pitch();

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(pagination.pages.len());

        for page in &pagination.pages {
            let mut ops: Vec<Op> = Vec::with_capacity(page.lines.len() * 5);
            for (index, line) in page.lines.iter().enumerate() {
                if line.is_blank() {
                    continue;
                }
                let y_pt = layout.page_height - layout.margin - index as f32 * pitch;

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(layout.margin),
                        y: Pt(y_pt),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(layout.font_size),
                    font: BuiltinFont::Helvetica,
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(line.text().to_string())],
                    font: BuiltinFont::Helvetica,
                });
                ops.push(Op::EndTextSection);
            }
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        doc.with_pages(pages);
        debug!(pages = doc.pages.len(), "Text layout rendered");

        Ok(save(&doc))
    }

    // -- Image to PDF ---------------------------------------------------------

    /// Single-page PDF whose page matches the image's pixel size, image drawn
    /// at the origin.
    #[instrument(skip(self, image_bytes), fields(bytes_len = image_bytes.len()))]
    pub fn create_from_image(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = ::image::load_from_memory(image_bytes).map_err(|err| {
            DocuhubError::ImageError(format!("failed to decode image for PDF: {}", err))
        })?;
        info!(
            width = decoded.width(),
            height = decoded.height(),
            "Creating image PDF"
        );

        let mut doc = PdfDocument::new(self.title_or("DocuHub Image"));
        let page = image_page(&mut doc, &decoded);
        doc.with_pages(vec![page]);
        Ok(save(&doc))
    }

    // -- Raster pages ---------------------------------------------------------

    /// One page per raster, each sized to its buffer. Used for redaction
    /// output, which must carry no text layer.
    #[instrument(skip_all, fields(pages = rasters.len()))]
    pub fn create_from_rasters(&self, rasters: Vec<RgbaImage>) -> Result<Vec<u8>> {
        if rasters.is_empty() {
            return Err(DocuhubError::PdfError(
                "cannot build a PDF without pages".to_string(),
            ));
        }

        let mut doc = PdfDocument::new(self.title_or("DocuHub Redacted"));
        let pages: Vec<PdfPage> = rasters
            .into_iter()
            .map(|raster| image_page(&mut doc, &DynamicImage::ImageRgba8(raster)))
            .collect();
        doc.with_pages(pages);

        let output = save(&doc);
        debug!(output_bytes = output.len(), "Raster PDF written");
        Ok(output)
    }
}

/// Embed `image` and return a page of exactly its pixel size showing it.
fn image_page(doc: &mut PdfDocument, image: &DynamicImage) -> PdfPage {
    let (width, height) = (image.width(), image.height());
    let raw = RawImage {
        pixels: RawImageData::U8(image.to_rgb8().into_raw()),
        width: width as usize,
        height: height as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let xobject_id = doc.add_image(&raw);

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            scale_x: None,
            scale_y: None,
            dpi: Some(POINT_DPI),
            rotate: None,
        },
    }];

    PdfPage::new(pt_to_mm(width as f32), pt_to_mm(height as f32), ops)
}

fn save(doc: &PdfDocument) -> Vec<u8> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(warnings = warnings.len(), "printpdf reported warnings");
    }
    output
}
