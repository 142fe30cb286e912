// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use docuhub_core::stamp::NumberPosition;

/// Local document toolkit: merge, split, compress, redact, protect,
/// watermark, number pages, convert to PDF, inspect and OCR.
#[derive(Debug, Parser)]
#[command(name = "docuhub", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Combine PDFs in the order given
    Merge {
        /// PDFs to merge
        #[arg(value_name = "FILE", required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract pages into a new PDF
    Split {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages to keep (e.g. '2-3', '6' or '1,3-5')
        #[arg(long)]
        pages: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Reduce PDF file size
    Compress {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Size to aim for (e.g. '1MB', '500KB'). Remembered for next time
        #[arg(long)]
        target: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Black out regions by rasterising every page
    #[cfg(feature = "render")]
    Redact {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Region as 'page:x,y,w,h' in points from the top-left corner
        #[arg(long = "rect", value_name = "PAGE:X,Y,W,H", value_parser = parse_rect)]
        rects: Vec<RectArg>,

        /// Drop the regions under 'page:x,y' (points), padded by the
        /// configured erase padding
        #[arg(long = "erase", value_name = "PAGE:X,Y", value_parser = parse_point)]
        erase: Vec<PointArg>,

        /// Render scale in pixels per point (default from config)
        #[arg(long)]
        scale: Option<f32>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt a PDF with a password
    Protect {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Password needed to open the document
        #[arg(long)]
        user_password: String,

        /// Password for full permissions (defaults to the user password)
        #[arg(long)]
        owner_password: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Stamp a text watermark on every page
    Watermark {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Watermark text (default: last used)
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        font_size: Option<f32>,

        /// Grey level from 0 (black) to 1 (white)
        #[arg(long)]
        gray: Option<f32>,

        /// Rotation in degrees
        #[arg(long)]
        rotation: Option<f32>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add page numbers
    PageNumbers {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Label template with {n} and {total}
        #[arg(long)]
        format: Option<String>,

        #[arg(long, value_enum)]
        position: Option<PositionArg>,

        #[arg(long)]
        start_at: Option<u32>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert TXT, JSON, HTML, DOCX, JPEG or PNG to PDF
    ToPdf {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF (default: input name with .pdf, next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show file and PDF metadata
    Metadata {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recognise text in an image
    #[cfg(feature = "ocr")]
    Ocr {
        #[arg(value_name = "IMAGE")]
        input: PathBuf,

        /// Directory holding the ocrs model files
        #[arg(long)]
        models: Option<PathBuf>,

        /// Output text file (default: input name with .txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List, remove or review recently produced files
    Recent {
        /// Remove the entry at this position (1 = newest)
        #[arg(long, value_name = "N")]
        remove: Option<usize>,

        /// Show recently removed entries instead
        #[arg(long)]
        deleted: bool,
    },

    /// List the available tools with usage counts
    Tools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PositionArg {
    BottomCenter,
    BottomRight,
    BottomLeft,
    TopCenter,
    TopRight,
    TopLeft,
}

impl From<PositionArg> for NumberPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::BottomCenter => Self::BottomCenter,
            PositionArg::BottomRight => Self::BottomRight,
            PositionArg::BottomLeft => Self::BottomLeft,
            PositionArg::TopCenter => Self::TopCenter,
            PositionArg::TopRight => Self::TopRight,
            PositionArg::TopLeft => Self::TopLeft,
        }
    }
}

/// A redaction region on one page, in points from the top-left corner.
#[cfg_attr(not(feature = "render"), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectArg {
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Parse `page:x,y,w,h`.
#[cfg_attr(not(feature = "render"), allow(dead_code))]
pub fn parse_rect(input: &str) -> Result<RectArg, String> {
    let (page, values) = split_page(input, "PAGE:X,Y,W,H")?;
    let &[x, y, width, height] = values.as_slice() else {
        return Err(format!("expected four coordinates, got {}", values.len()));
    };
    if width <= 0.0 || height <= 0.0 {
        return Err("width and height must be positive".to_string());
    }

    Ok(RectArg {
        page,
        x,
        y,
        width,
        height,
    })
}

/// A point on one page, in points from the top-left corner.
#[cfg_attr(not(feature = "render"), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointArg {
    pub page: u32,
    pub x: f32,
    pub y: f32,
}

/// Parse `page:x,y`.
#[cfg_attr(not(feature = "render"), allow(dead_code))]
pub fn parse_point(input: &str) -> Result<PointArg, String> {
    let (page, values) = split_page(input, "PAGE:X,Y")?;
    let &[x, y] = values.as_slice() else {
        return Err(format!("expected two coordinates, got {}", values.len()));
    };
    Ok(PointArg { page, x, y })
}

fn split_page(input: &str, shape: &str) -> Result<(u32, Vec<f32>), String> {
    let (page, coords) = input
        .split_once(':')
        .ok_or_else(|| format!("expected {shape}, got '{input}'"))?;
    let page: u32 = page
        .trim()
        .parse()
        .map_err(|_| format!("invalid page number '{page}'"))?;
    if page == 0 {
        return Err("pages are numbered from 1".to_string());
    }

    let values = coords
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|_| format!("invalid coordinate '{v}'")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((page, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rectangles() {
        assert_eq!(
            parse_rect("2:10,20.5,100,40").unwrap(),
            RectArg {
                page: 2,
                x: 10.0,
                y: 20.5,
                width: 100.0,
                height: 40.0
            }
        );
    }

    #[test]
    fn rejects_bad_rectangles() {
        assert!(parse_rect("10,20,30,40").is_err());
        assert!(parse_rect("0:1,1,1,1").is_err());
        assert!(parse_rect("1:1,1,1").is_err());
        assert!(parse_rect("1:1,1,0,5").is_err());
        assert!(parse_rect("1:a,1,1,1").is_err());
    }

    #[test]
    fn parses_erase_points() {
        assert_eq!(
            parse_point("3:12,7.5").unwrap(),
            PointArg {
                page: 3,
                x: 12.0,
                y: 7.5
            }
        );
        assert!(parse_point("3:12").is_err());
        assert!(parse_point("0:1,1").is_err());
    }

    #[test]
    fn merge_needs_two_inputs() {
        assert!(Cli::try_parse_from(["docuhub", "merge", "a.pdf", "-o", "out.pdf"]).is_err());
        assert!(
            Cli::try_parse_from(["docuhub", "merge", "a.pdf", "b.pdf", "-o", "out.pdf"]).is_ok()
        );
    }
}
