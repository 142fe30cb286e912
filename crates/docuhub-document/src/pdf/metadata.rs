// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata viewer — file facts for any upload, plus document facts and the
// Info dictionary for PDFs.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use docuhub_core::error::{DocuhubError, Result};
use docuhub_core::types::{DocumentType, human_size};
use lopdf::{Document, Object};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Info dictionary keys shown by the viewer, in display order.
pub const INFO_KEYS: [&str; 8] = [
    "Title",
    "Author",
    "Subject",
    "Keywords",
    "Creator",
    "Producer",
    "CreationDate",
    "ModDate",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub human_size: String,
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<PdfMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    pub version: String,
    pub page_count: u32,
    pub encrypted: bool,
    /// Present Info entries only, keyed by their PDF names.
    pub info: BTreeMap<String, String>,
}

/// Describe an in-memory file. PDFs that fail to parse are still described,
/// just without document facts.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn inspect(name: &str, data: &[u8], last_modified: Option<DateTime<Utc>>) -> FileMetadata {
    let document_type = DocumentType::from_file_name(name);
    let pdf = if document_type == DocumentType::Pdf {
        match pdf_metadata(data) {
            Ok(meta) => Some(meta),
            Err(err) => {
                warn!(%err, "could not read PDF metadata");
                None
            }
        }
    } else {
        None
    };

    FileMetadata {
        name: name.to_string(),
        mime_type: document_type.mime_type().to_string(),
        size: data.len() as u64,
        human_size: human_size(data.len() as u64),
        last_modified,
        pdf,
    }
}

/// Last modification time of a file on disk, when the platform reports one.
pub fn modified_time(path: impl AsRef<Path>) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Version, page count, encryption flag and Info entries of a PDF.
pub fn pdf_metadata(data: &[u8]) -> Result<PdfMetadata> {
    let document = Document::load_mem(data)
        .map_err(|err| DocuhubError::PdfError(format!("failed to load PDF: {}", err)))?;

    let mut info = BTreeMap::new();
    if let Some(dict) = info_dictionary(&document) {
        for key in INFO_KEYS {
            if let Ok(Object::String(bytes, _)) = dict.get(key.as_bytes()) {
                let value = decode_text(bytes);
                if !value.is_empty() {
                    info.insert(key.to_string(), value);
                }
            }
        }
    }

    let meta = PdfMetadata {
        version: document.version.clone(),
        page_count: document.get_pages().len() as u32,
        encrypted: document.is_encrypted(),
        info,
    };
    debug!(pages = meta.page_count, fields = meta.info.len(), "PDF metadata read");
    Ok(meta)
}

fn info_dictionary(document: &Document) -> Option<&lopdf::Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with a byte-order mark, otherwise
/// treated as single-byte text.
fn decode_text(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&byte| byte as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::sample_pdf;
    use lopdf::{StringFormat, dictionary};

    fn with_info(data: &[u8]) -> Vec<u8> {
        let mut doc = Document::load_mem(data).unwrap();
        let mut title = vec![0xFE, 0xFF];
        for unit in "Résumé".encode_utf16() {
            title.extend_from_slice(&unit.to_be_bytes());
        }
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(title, StringFormat::Literal),
            "Author" => Object::string_literal("Ada"),
        });
        doc.trailer.set("Info", info_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn pdf_facts_and_info_fields() {
        let data = with_info(&sample_pdf(&["P1", "P2"]));
        let meta = inspect("report.pdf", &data, None);

        assert_eq!(meta.mime_type, "application/pdf");
        let pdf = meta.pdf.unwrap();
        assert_eq!(pdf.page_count, 2);
        assert_eq!(pdf.version, "1.5");
        assert!(!pdf.encrypted);
        assert_eq!(pdf.info.get("Title").map(String::as_str), Some("Résumé"));
        assert_eq!(pdf.info.get("Author").map(String::as_str), Some("Ada"));
        assert!(!pdf.info.contains_key("Subject"));
    }

    #[test]
    fn non_pdf_gets_file_facts_only() {
        let meta = inspect("notes.txt", &[b'x'; 2048], None);
        assert_eq!(meta.human_size, "2.00 KB");
        assert_eq!(meta.mime_type, "text/plain");
        assert!(meta.pdf.is_none());
    }

    #[test]
    fn broken_pdf_still_described() {
        let meta = inspect("broken.pdf", b"%PDF-1.4 nonsense", None);
        assert_eq!(meta.size, 17);
        assert!(meta.pdf.is_none());
    }

    #[test]
    fn modification_time_comes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let modified = modified_time(&path);
        assert!(modified.is_some());
        assert!(modified_time(dir.path().join("missing.bin")).is_none());

        let meta = inspect("tiny.bin", &[1, 2, 3], modified);
        assert_eq!(meta.human_size, "3 bytes");
        assert_eq!(meta.last_modified, modified);
    }
}
