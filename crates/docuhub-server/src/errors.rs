// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP error type. Handlers return `Result<T, ApiError>`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docuhub_core::error::DocuhubError;
use docuhub_core::human_errors::humanize_error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Anything that goes wrong while compressing, including an unreadable
    /// request or bad base64. Clients only ever see a generic message.
    #[error("compression failed: {0}")]
    Compression(String),

    #[error(transparent)]
    Document(#[from] DocuhubError),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("worker task failed: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "File too large".to_string())
            }
            ApiError::Document(err @ DocuhubError::FileTooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, humanize_error(err).message)
            }
            ApiError::Document(err) => {
                tracing::error!(error = %err, "compression failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Compression failed".to_string(),
                )
            }
            ApiError::Compression(detail) | ApiError::Internal(detail) => {
                tracing::error!(%detail, "compression failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Compression failed".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
