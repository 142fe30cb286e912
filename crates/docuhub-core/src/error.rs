// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for DocuHub.

use thiserror::Error;

/// Top-level error type for all DocuHub operations.
#[derive(Debug, Error)]
pub enum DocuhubError {
    // -- Upload validation --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("invalid page range: {0}")]
    InvalidPageRange(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("page rendering failed: {0}")]
    RenderError(String),

    #[error("text extraction failed: {0}")]
    ExtractionError(String),

    #[error("no readable text found in {0}")]
    EmptyDocument(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    // -- Sessions --
    #[error("no active tool session")]
    NoActiveSession,

    // -- Storage / persistence --
    #[error("preferences store error: {0}")]
    Preferences(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocuhubError>;
