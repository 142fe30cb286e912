// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction driven through the drawing model, with a stand-in renderer.

mod common;

use common::{WhitePages, page_count};
use docuhub_document::redact::{Point, RectangleDraft, RedactionSet, redact_document};
use lopdf::Document;

#[test]
fn drawn_and_erased_rectangles_shape_the_output() {
    let mut redactions = RedactionSet::new();

    // Drag bottom-right to top-left on page 1.
    let mut draft = RectangleDraft::begin(Point::new(300.0, 200.0));
    draft.update(Point::new(250.0, 150.0));
    draft.update(Point::new(100.0, 100.0));
    redactions.add(1, draft.finish());

    // A second box on page 2, then erased again.
    let mut draft = RectangleDraft::begin(Point::new(10.0, 10.0));
    draft.update(Point::new(60.0, 40.0));
    redactions.add(2, draft.finish());
    assert_eq!(redactions.erase_at(2, Point::new(63.0, 42.0), 5.0), 1);

    assert_eq!(redactions.total(), 1);
    assert!(redactions.rectangles(2).is_empty());

    let output = redact_document(&WhitePages { count: 2 }, &redactions, 1.5).unwrap();
    assert_eq!(page_count(&output), 2);

    // Each page is sized to its raster: 595x842 pt at scale 1.5.
    let doc = Document::load_mem(&output).unwrap();
    for (_, page_id) in doc.get_pages() {
        let media_box = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect::<Vec<_>>();
        assert!((media_box[2] - 892.0).abs() < 1.0, "{media_box:?}");
        assert!((media_box[3] - 1263.0).abs() < 1.0, "{media_box:?}");
    }
}

#[test]
fn renderer_failure_is_reported_with_the_page() {
    struct Broken;
    impl docuhub_document::PageRasterizer for Broken {
        fn page_count(&self) -> u32 {
            1
        }
        fn render_page(
            &self,
            _page_number: u32,
            _scale: f32,
        ) -> docuhub_core::error::Result<image::RgbaImage> {
            Err(docuhub_core::error::DocuhubError::RenderError("no pdfium".into()))
        }
    }

    let err = redact_document(&Broken, &RedactionSet::new(), 1.5).unwrap_err();
    assert!(err.to_string().contains("page 1"));
}
