// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading, merging, splitting, compressing, protecting,
// stamping, inspecting and creating PDFs.

pub mod compress;
pub mod metadata;
pub mod protect;
pub mod reader;
pub mod stamp;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use compress::{CompressionOutcome, CompressionReport, compress};
pub use metadata::{FileMetadata, PdfMetadata};
pub use protect::protect;
pub use reader::{PdfReader, merge};
pub use stamp::{add_page_numbers, add_watermark};
pub use writer::PdfWriter;
