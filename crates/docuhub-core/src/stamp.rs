// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for the watermark and page-number tools. Cached in the
// preferences store between runs.

use serde::{Deserialize, Serialize};

/// Text watermark drawn across every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    pub text: String,
    pub font_size: f32,
    /// Grey level of the text, 0.0 (black) to 1.0 (white).
    pub gray: f32,
    /// Counter-clockwise rotation in degrees.
    pub rotation_degrees: f32,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            text: "CONFIDENTIAL".to_string(),
            font_size: 48.0,
            gray: 0.75,
            rotation_degrees: 45.0,
        }
    }
}

/// Where page numbers are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberPosition {
    BottomCenter,
    BottomRight,
    BottomLeft,
    TopCenter,
    TopRight,
    TopLeft,
}

/// Page-number stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberSettings {
    /// Template; `{n}` is the page number and `{total}` the page count.
    pub format: String,
    pub position: NumberPosition,
    pub font_size: f32,
    /// Distance from the page edge in points.
    pub margin: f32,
    /// Number given to the first page.
    pub start_at: u32,
}

impl Default for PageNumberSettings {
    fn default() -> Self {
        Self {
            format: "{n} / {total}".to_string(),
            position: NumberPosition::BottomCenter,
            font_size: 10.0,
            margin: 30.0,
            start_at: 1,
        }
    }
}

impl PageNumberSettings {
    /// Render the label for a 0-based page index.
    pub fn label(&self, index: usize, total: usize) -> String {
        let number = self.start_at as usize + index;
        let last = self.start_at as usize + total.saturating_sub(1);
        self.format
            .replace("{n}", &number.to_string())
            .replace("{total}", &last.to_string())
    }
}
