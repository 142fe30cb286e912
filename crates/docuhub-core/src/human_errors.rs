// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages shown by the tool front ends.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Nothing is retried automatically: `retriable` only tells the front end
// whether offering a "try again" button makes sense.

use crate::error::DocuhubError;
use crate::types::human_size;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something outside the file went wrong; trying again may work.
    Transient,
    /// The user must change their input (pick another file, fix the range).
    ActionRequired,
    /// The file itself cannot be processed by this tool.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-triggering the same operation could succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `DocuhubError` into a `HumanError`.
pub fn humanize_error(err: &DocuhubError) -> HumanError {
    match err {
        // -- Upload validation --
        DocuhubError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file isn't supported by this tool.".into(),
            suggestion: format!("Choose a file with one of the accepted extensions. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocuhubError::FileTooLarge { size, limit } => HumanError {
            message: format!(
                "File too large ({}). Max {}.",
                size_label(*size),
                size_label(*limit)
            ),
            suggestion: "Try compressing the file first, or split it into smaller parts.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocuhubError::InvalidPageRange(detail) => HumanError {
            message: "Invalid page range.".into(),
            suggestion: format!(
                "Enter a page number or a range like 2-3 that exists in the document. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Document errors --
        DocuhubError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try opening it in a PDF viewer first to check it works, or try a different file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocuhubError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocuhubError::OcrError(_) => HumanError {
            message: "Failed to extract text.".into(),
            suggestion: "Try a sharper image where the text is clear and in focus.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DocuhubError::RenderError(_) => HumanError {
            message: "A page of this PDF couldn't be drawn.".into(),
            suggestion: "The file may be damaged. No redacted copy was produced; try a different file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocuhubError::ExtractionError(_) => HumanError {
            message: "We couldn't read the text in this document.".into(),
            suggestion: "Try saving the document as plain text (.txt) and convert that instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocuhubError::EmptyDocument(_) => HumanError {
            message: "No readable text found in file.".into(),
            suggestion: "Check that the document actually contains text.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocuhubError::Encryption(_) => HumanError {
            message: "Failed to protect PDF.".into(),
            suggestion: "Choose a non-empty password and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Sessions --
        DocuhubError::NoActiveSession => HumanError {
            message: "No file selected.".into(),
            suggestion: "Upload a file before starting the tool.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Storage --
        DocuhubError::Preferences(_) => HumanError {
            message: "Your saved preferences couldn't be updated.".into(),
            suggestion: "Your file was processed; only the recent-files list may be out of date.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DocuhubError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "DocuHub doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        DocuhubError::Serialization(_) => HumanError {
            message: "DocuHub had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Whole megabytes print without a decimal; anything under 1 MiB falls back
/// to the byte/KB form.
fn size_label(bytes: u64) -> String {
    if bytes < 1024 * 1024 {
        return human_size(bytes);
    }
    let label = format!("{:.1}MB", bytes as f64 / 1024.0 / 1024.0);
    match label.strip_suffix(".0MB") {
        Some(whole) => format!("{whole}MB"),
        None => label,
    }
}
