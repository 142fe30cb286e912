// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction rectangles in canvas pixel space, the pointer-driven drawing
// model, the erase tool and the per-page rectangle set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box with non-negative width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// Build from any position and size, flipping negative extents.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// The box spanned by two opposite corners, in either order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Whether `point` lies inside the box grown by `padding` on every side.
    /// Edges count as inside.
    pub fn contains_padded(&self, point: Point, padding: f32) -> bool {
        point.x >= self.x - padding
            && point.x <= self.x + self.width + padding
            && point.y >= self.y - padding
            && point.y <= self.y + self.height + padding
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A rectangle being drawn: started on pointer-down, stretched on
/// pointer-move and closed on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleDraft {
    start: Point,
    current: Point,
}

impl RectangleDraft {
    pub fn begin(point: Point) -> Self {
        Self {
            start: point,
            current: point,
        }
    }

    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    /// The rectangle as currently stretched, for live preview.
    pub fn preview(&self) -> Rectangle {
        Rectangle::from_corners(self.start, self.current)
    }

    pub fn finish(self) -> Rectangle {
        self.preview()
    }
}

/// Remove every rectangle whose padded box contains `point`.
pub fn erase(existing: &[Rectangle], point: Point, padding: f32) -> Vec<Rectangle> {
    existing
        .iter()
        .filter(|rect| !rect.contains_padded(point, padding))
        .copied()
        .collect()
}

/// Redaction rectangles keyed by 1-indexed page number. Pages without an
/// entry have no redactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactionSet {
    pages: BTreeMap<u32, Vec<Rectangle>>,
}

impl RedactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a rectangle for `page`. Degenerate (zero-area) rectangles, such
    /// as a click without a drag, are ignored.
    pub fn add(&mut self, page: u32, rect: Rectangle) {
        if rect.is_empty() {
            debug!(page, "ignoring zero-area rectangle");
            return;
        }
        self.pages.entry(page).or_default().push(rect);
    }

    pub fn rectangles(&self, page: u32) -> &[Rectangle] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply the erase tool on `page`. Returns how many rectangles went.
    pub fn erase_at(&mut self, page: u32, point: Point, padding: f32) -> usize {
        let Some(rects) = self.pages.get_mut(&page) else {
            return 0;
        };
        let before = rects.len();
        *rects = erase(rects, point, padding);
        let removed = before - rects.len();
        if rects.is_empty() {
            self.pages.remove(&page);
        }
        removed
    }

    pub fn clear_page(&mut self, page: u32) {
        self.pages.remove(&page);
    }

    /// Total rectangles across all pages.
    pub fn total(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages that carry at least one rectangle, ascending.
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drafts_normalise_any_drag_direction() {
        let mut draft = RectangleDraft::begin(Point::new(50.0, 80.0));
        draft.update(Point::new(30.0, 100.0));
        draft.update(Point::new(10.0, 20.0));
        assert_eq!(draft.finish(), Rectangle::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn new_flips_negative_extent() {
        assert_eq!(
            Rectangle::new(100.0, 100.0, -20.0, -10.0),
            Rectangle::new(80.0, 90.0, 20.0, 10.0)
        );
    }

    #[test]
    fn erase_uses_inclusive_padding() {
        let rects = vec![
            Rectangle::new(10.0, 10.0, 20.0, 20.0),
            Rectangle::new(100.0, 100.0, 10.0, 10.0),
        ];
        // Exactly on the padded edge of the first rectangle.
        let kept = erase(&rects, Point::new(35.0, 20.0), 5.0);
        assert_eq!(kept, vec![rects[1]]);

        let untouched = erase(&rects, Point::new(36.0, 20.0), 5.0);
        assert_eq!(untouched, rects);
    }

    #[test]
    fn erase_is_idempotent() {
        let rects = vec![
            Rectangle::new(0.0, 0.0, 10.0, 10.0),
            Rectangle::new(5.0, 5.0, 10.0, 10.0),
            Rectangle::new(50.0, 50.0, 10.0, 10.0),
        ];
        let point = Point::new(7.0, 7.0);
        let once = erase(&rects, point, 5.0);
        assert_eq!(erase(&once, point, 5.0), once);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn redaction_set_bookkeeping() {
        let mut set = RedactionSet::new();
        set.add(1, Rectangle::new(0.0, 0.0, 10.0, 10.0));
        set.add(1, Rectangle::new(40.0, 40.0, 10.0, 10.0));
        set.add(3, Rectangle::new(0.0, 0.0, 5.0, 5.0));
        set.add(2, Rectangle::new(5.0, 5.0, 0.0, 9.0));

        assert_eq!(set.total(), 3);
        assert!(set.rectangles(2).is_empty());
        assert_eq!(set.pages().collect::<Vec<_>>(), vec![1, 3]);

        assert_eq!(set.erase_at(1, Point::new(45.0, 45.0), 5.0), 1);
        assert_eq!(set.rectangles(1).len(), 1);
        assert_eq!(set.erase_at(7, Point::new(0.0, 0.0), 5.0), 0);

        set.clear_page(3);
        assert_eq!(set.total(), 1);
        assert_eq!(set.erase_at(1, Point::new(5.0, 5.0), 0.0), 1);
        assert!(set.is_empty());
    }
}
