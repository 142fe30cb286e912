// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// POST /api/compress — re-save a base64 PDF and report the size change.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docuhub_core::error::DocuhubError;
use docuhub_document::compress;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressRequest {
    /// The PDF, optionally as a `data:...;base64,` URL.
    pub base64: String,
    /// Size the output should fit in, in bytes.
    #[serde(default)]
    pub target_bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressResponse {
    /// Original size in MB, two decimals.
    pub original: String,
    pub compressed: String,
    /// Whole-number percentage.
    pub reduction: String,
    /// Base64 of the compressed PDF.
    pub file: String,
    pub target_met: bool,
}

/// Drop a leading `data:<mime>;base64,` prefix.
pub fn strip_data_url(input: &str) -> &str {
    if !input.starts_with("data:") {
        return input;
    }
    match input.find(";base64,") {
        Some(index) => &input[index + ";base64,".len()..],
        None => input,
    }
}

#[instrument(skip_all)]
pub async fn compress_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompressRequest>, JsonRejection>,
) -> Result<Json<CompressResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::Compression(rejection.body_text())
        }
    })?;

    let data = STANDARD
        .decode(strip_data_url(request.base64.trim()))
        .map_err(|err| ApiError::Compression(format!("invalid base64: {err}")))?;

    let limit = state.config.max_upload_bytes;
    if data.len() as u64 > limit {
        return Err(DocuhubError::FileTooLarge {
            size: data.len() as u64,
            limit,
        }
        .into());
    }

    info!(bytes = data.len(), target = ?request.target_bytes, "compressing upload");
    let target = request.target_bytes;
    let outcome = tokio::task::spawn_blocking(move || compress(&data, target))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;

    let report = outcome.report;
    debug!(
        original = %report.original,
        compressed = %report.compressed,
        reduction = %report.reduction,
        "compression done"
    );
    Ok(Json(CompressResponse {
        original: report.original,
        compressed: report.compressed,
        reduction: report.reduction,
        file: STANDARD.encode(&outcome.bytes),
        target_met: report.target_met,
    }))
}
