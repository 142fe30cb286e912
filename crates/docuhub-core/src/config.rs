// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration and data directory resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default upload cap (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default cap for a single entry in the transient file store (4 MiB).
pub const DEFAULT_STORAGE_CAP_BYTES: u64 = 4 * 1024 * 1024;

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Uploads larger than this are rejected before processing.
    pub max_upload_bytes: u64,
    /// Largest encoded size kept in the transient file store.
    pub storage_cap_bytes: u64,
    /// Scale at which pages are rasterised for redaction.
    pub redaction_scale: f32,
    /// Padding (in canvas pixels) around rectangles when erasing.
    pub erase_padding: f32,
    /// Layout parameters for the document-to-PDF converter.
    pub text_layout: TextLayoutConfig,
    /// HTTP service settings.
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            storage_cap_bytes: DEFAULT_STORAGE_CAP_BYTES,
            redaction_scale: 1.5,
            erase_padding: 5.0,
            text_layout: TextLayoutConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Page geometry for text-to-PDF conversion, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub font_size: f32,
    /// Extra space between lines; line pitch is `font_size + line_gap`.
    pub line_gap: f32,
    /// Drop lines that do not fit in this many pages. `None` never drops.
    pub max_pages: Option<usize>,
    /// Wrap newline-separated paragraphs independently.
    pub preserve_paragraphs: bool,
}

impl TextLayoutConfig {
    /// Vertical distance between consecutive baselines.
    pub fn line_pitch(&self) -> f32 {
        self.font_size + self.line_gap
    }

    /// Usable line width between the left and right margins.
    pub fn max_line_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

impl Default for TextLayoutConfig {
    fn default() -> Self {
        // A4
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 50.0,
            font_size: 12.0,
            line_gap: 6.0,
            max_pages: None,
            preserve_paragraphs: false,
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load_or_default(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let Ok(data) = std::fs::read_to_string(&path) else {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed config file");
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON into `data_dir`.
    pub fn persist(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(CONFIG_FILE), json)?;
        Ok(())
    }

    /// Apply `DOCUHUB_HOST`, `DOCUHUB_PORT` and `DOCUHUB_MAX_UPLOAD_BYTES`
    /// overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unparseable values are
    /// ignored with a warning.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("DOCUHUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCUHUB_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(%port, "DOCUHUB_PORT is not a valid port, keeping default"),
            }
        }
        if let Some(limit) = lookup("DOCUHUB_MAX_UPLOAD_BYTES") {
            match limit.parse() {
                Ok(limit) => self.max_upload_bytes = limit,
                Err(_) => warn!(%limit, "DOCUHUB_MAX_UPLOAD_BYTES is not a number, keeping default"),
            }
        }
        self
    }
}

/// Return the application data directory (not created).
///
/// `DOCUHUB_DATA_DIR` wins; otherwise the XDG data dir, then
/// `~/.local/share`, each with a `docuhub` subdirectory.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCUHUB_DATA_DIR") {
        return PathBuf::from(dir);
    }
    base_data_dir().join("docuhub")
}

fn base_data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_document_converter_geometry() {
        let layout = TextLayoutConfig::default();
        assert_eq!((layout.page_width, layout.page_height), (595.0, 842.0));
        assert_eq!(layout.line_pitch(), 18.0);
        assert_eq!(layout.max_line_width(), 495.0);
        assert_eq!(layout.max_pages, None);
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.server.port = 8123;
        config.text_layout.max_pages = Some(1);
        config.persist(dir.path()).unwrap();

        let loaded = AppConfig::load_or_default(dir.path());
        assert_eq!(loaded.server.port, 8123);
        assert_eq!(loaded.text_layout.max_pages, Some(1));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"erase_padding": 8.0}"#).unwrap();
        let loaded = AppConfig::load_or_default(dir.path());
        assert_eq!(loaded.erase_padding, 8.0);
        assert_eq!(loaded.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn malformed_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        let loaded = AppConfig::load_or_default(dir.path());
        assert_eq!(loaded.server, ServerConfig::default());
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let config = AppConfig::default().with_overrides(|key| match key {
            "DOCUHUB_PORT" => Some("9000".into()),
            "DOCUHUB_MAX_UPLOAD_BYTES" => Some("many".into()),
            _ => None,
        });
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
