// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer shared by all commands: configuration, the persisted
// preferences store and the tool session that guards each run.

use std::path::{Path, PathBuf};

use docuhub_core::AppConfig;
use docuhub_core::config::data_dir;
use docuhub_core::error::Result;
use docuhub_core::prefs::{JsonFilePreferences, Preferences};
use docuhub_core::session::{SessionSlot, StoredFile, ToolSession, ToolState, ToolStateStore};
use docuhub_core::types::ToolId;
use tracing::{debug, info};

/// File name of the preferences store inside the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

pub struct AppServices {
    config: AppConfig,
    prefs: Preferences<JsonFilePreferences>,
    slot: SessionSlot,
}

impl AppServices {
    /// Open services on the default data directory.
    pub fn init() -> Result<Self> {
        Self::open_at(data_dir())
    }

    pub fn open_at(dir: PathBuf) -> Result<Self> {
        let config = AppConfig::load_or_default(&dir).with_env_overrides();
        let prefs = Preferences::new(JsonFilePreferences::open(dir.join(PREFERENCES_FILE))?);
        info!(path = %dir.display(), "services ready");
        Ok(Self {
            config,
            prefs,
            slot: SessionSlot::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn prefs(&self) -> &Preferences<JsonFilePreferences> {
        &self.prefs
    }

    /// Read `path`, validate it for `tool` and hand the file to processing.
    /// The file's metadata is kept in the tool state until the run completes.
    pub fn load_input(&mut self, tool: ToolId, path: &Path) -> Result<StoredFile> {
        let data = std::fs::read(path)?;
        let name = display_name(path);
        let session = ToolSession::open(tool, &name, data, self.config.max_upload_bytes)?;

        let state = ToolState {
            file_meta: session.file_meta().cloned(),
        };
        ToolStateStore::new(self.prefs.store()).save(tool, &state)?;

        self.slot.begin(session).take_file()
    }

    /// Close the run: clear the tool state and record the tool and output
    /// in the history.
    pub fn complete(&mut self, tool: ToolId, output: &Path) -> Result<()> {
        if let Some(session) = self.slot.finish() {
            debug!(session = %session.id(), "run complete");
        }
        ToolStateStore::new(self.prefs.store()).clear(tool)?;
        self.prefs.record_tool_use(tool)?;
        self.prefs.add_recent_file(display_name(output), tool)?;
        Ok(())
    }
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}

/// Final path component as a string.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
