// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Password protection — standard security handler, RC4 128-bit, via lopdf.

use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use docuhub_core::error::{DocuhubError, Result};

use crate::pdf::reader::serialise;

const KEY_LENGTH_BITS: usize = 128;

/// Encrypt `data` so it opens only with `user_password` (or the owner
/// password). The owner password defaults to the user password.
#[instrument(skip_all, fields(data_len = data.len()))]
pub fn protect(data: &[u8], user_password: &str, owner_password: Option<&str>) -> Result<Vec<u8>> {
    if user_password.is_empty() {
        return Err(DocuhubError::Encryption(
            "a user password is required".to_string(),
        ));
    }

    let mut document = Document::load_mem(data)
        .map_err(|err| DocuhubError::PdfError(format!("failed to load PDF: {}", err)))?;
    if document.is_encrypted() {
        return Err(DocuhubError::Encryption(
            "document is already password protected".to_string(),
        ));
    }

    // The key derivation mixes in the first file identifier.
    if document.trailer.get(b"ID").is_err() {
        let digest = Sha256::digest(data);
        let id = digest[..16].to_vec();
        document.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(id.clone(), StringFormat::Hexadecimal),
                Object::String(id, StringFormat::Hexadecimal),
            ]),
        );
    }

    let owner_password = owner_password
        .filter(|password| !password.is_empty())
        .unwrap_or(user_password);

    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &document,
        owner_password,
        user_password,
        key_length: KEY_LENGTH_BITS,
        permissions: Permissions::all(),
    })
    .map_err(|err| DocuhubError::Encryption(err.to_string()))?;

    document
        .encrypt(&state)
        .map_err(|err| DocuhubError::Encryption(err.to_string()))?;

    let output = serialise(&mut document, "protected PDF")?;
    info!(output_bytes = output.len(), "PDF protected");
    Ok(output)
}
