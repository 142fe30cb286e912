// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload validation and file fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{DocuhubError, Result};
use crate::types::{DocumentType, ToolId, extension_of};

/// Metadata about an uploaded file, kept for restore-on-navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let mime = DocumentType::from_file_name(&name).mime_type().to_string();
        Self { name, size, mime }
    }
}

/// Check a file against a tool's accepted extensions and the upload cap.
///
/// The extension check runs first so an oversized file of the wrong type is
/// reported as the wrong type.
pub fn validate_upload(tool: ToolId, meta: &FileMeta, max_bytes: u64) -> Result<DocumentType> {
    let allowed = tool.accepted_extensions();
    let ext = extension_of(&meta.name)
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    if !allowed.is_empty() && !allowed.contains(&ext.as_str()) {
        return Err(DocuhubError::UnsupportedDocument(format!(
            "Unsupported file type. Allowed: {}",
            allowed.join(", ")
        )));
    }

    if meta.size > max_bytes {
        return Err(DocuhubError::FileTooLarge {
            size: meta.size,
            limit: max_bytes,
        });
    }

    debug!(tool = %tool, name = %meta.name, size = meta.size, "upload accepted");
    Ok(DocumentType::from_file_name(&meta.name))
}

/// Compute the SHA-256 of `data` as a lowercase hex string.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
