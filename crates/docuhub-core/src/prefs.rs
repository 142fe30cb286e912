// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// User preferences: a small key/value store plus typed bookkeeping on top of
// it (last-used tool, recent tools, usage counters, recent files, cached
// watermark and page-number settings).
//
// The store is a trait so front ends can inject a file-backed store and
// tests can use the in-memory one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DocuhubError, Result};
use crate::stamp::{PageNumberSettings, WatermarkSettings};
use crate::types::ToolId;

/// Maximum entries kept in the recent tools, recent files and recently
/// deleted lists.
pub const RECENT_LIMIT: usize = 5;

pub const KEY_LAST_TOOL: &str = "lastTool";
pub const KEY_RECENT_TOOLS: &str = "recentTools";
pub const KEY_TOOL_USAGE: &str = "toolUsage";
pub const KEY_RECENT_FILES: &str = "recentFiles";
pub const KEY_DELETED_FILES: &str = "deletedRecentFiles";
pub const KEY_WATERMARK: &str = "watermarkConfig";
pub const KEY_PAGE_NUMBERS: &str = "pageNumberConfig";
pub const KEY_TARGET_SIZE: &str = "targetSize";

/// Key/value storage for JSON values.
pub trait UserPreferencesStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

fn poisoned() -> DocuhubError {
    DocuhubError::Preferences("preferences lock poisoned".to_string())
}

// -- In-memory store ----------------------------------------------------------

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserPreferencesStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().map_err(|_| poisoned())?.clear();
        Ok(())
    }
}

// -- JSON file store ----------------------------------------------------------

/// Store persisted as a single JSON object, rewritten on every change.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFilePreferences {
    /// Open (or lazily create) the store at `path`. A corrupt file is treated
    /// as empty and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "preferences file is corrupt, starting fresh");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "preferences loaded");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl UserPreferencesStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value);
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.clear();
        self.flush(&entries)
    }
}

// -- Typed bookkeeping --------------------------------------------------------

/// A file recently produced by a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentFile {
    pub name: String,
    pub tool: ToolId,
    pub time: DateTime<Utc>,
}

/// A recent-file entry the user removed from the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedFile {
    pub name: String,
    pub tool: ToolId,
    pub time: DateTime<Utc>,
    #[serde(rename = "deletedTime")]
    pub deleted_time: DateTime<Utc>,
}

/// Typed view over any [`UserPreferencesStore`].
pub struct Preferences<S> {
    store: S,
}

impl<S: UserPreferencesStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read a typed value. Malformed entries are logged and treated as absent.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(err) => {
                warn!(key, %err, "ignoring malformed preference");
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, serde_json::to_value(value)?)
    }

    // -- Tools ----------------------------------------------------------------

    /// Record that `tool` was opened: updates the last tool, the recent tools
    /// list and the usage counter.
    pub fn record_tool_use(&self, tool: ToolId) -> Result<()> {
        self.write(KEY_LAST_TOOL, &tool)?;

        let mut recent = self.recent_tools()?;
        recent.retain(|existing| *existing != tool);
        recent.insert(0, tool);
        recent.truncate(RECENT_LIMIT);
        self.write(KEY_RECENT_TOOLS, &recent)?;

        let mut usage = self.usage_counts()?;
        *usage.entry(tool.as_str().to_string()).or_insert(0) += 1;
        self.write(KEY_TOOL_USAGE, &usage)?;

        debug!(tool = %tool, "tool use recorded");
        Ok(())
    }

    pub fn last_tool(&self) -> Result<Option<ToolId>> {
        self.read(KEY_LAST_TOOL)
    }

    /// Most recently used first, at most [`RECENT_LIMIT`].
    pub fn recent_tools(&self) -> Result<Vec<ToolId>> {
        Ok(self.read(KEY_RECENT_TOOLS)?.unwrap_or_default())
    }

    /// Usage counters keyed by tool id.
    pub fn usage_counts(&self) -> Result<BTreeMap<String, u64>> {
        Ok(self.read(KEY_TOOL_USAGE)?.unwrap_or_default())
    }

    pub fn usage_count(&self, tool: ToolId) -> Result<u64> {
        Ok(self
            .usage_counts()?
            .get(tool.as_str())
            .copied()
            .unwrap_or(0))
    }

    // -- Recent files ---------------------------------------------------------

    /// Push a file to the front of the recent files list.
    pub fn add_recent_file(&self, name: impl Into<String>, tool: ToolId) -> Result<()> {
        let mut files = self.recent_files()?;
        files.insert(
            0,
            RecentFile {
                name: name.into(),
                tool,
                time: Utc::now(),
            },
        );
        files.truncate(RECENT_LIMIT);
        self.write(KEY_RECENT_FILES, &files)
    }

    pub fn recent_files(&self) -> Result<Vec<RecentFile>> {
        Ok(self.read(KEY_RECENT_FILES)?.unwrap_or_default())
    }

    /// Remove the recent file at `index`, keeping a shadow copy in the
    /// recently deleted list. Returns the removed entry, if any.
    pub fn delete_recent_file(&self, index: usize) -> Result<Option<RecentFile>> {
        let mut files = self.recent_files()?;
        if index >= files.len() {
            return Ok(None);
        }
        let removed = files.remove(index);
        self.write(KEY_RECENT_FILES, &files)?;

        let mut deleted = self.deleted_files()?;
        deleted.insert(
            0,
            DeletedFile {
                name: removed.name.clone(),
                tool: removed.tool,
                time: removed.time,
                deleted_time: Utc::now(),
            },
        );
        deleted.truncate(RECENT_LIMIT);
        self.write(KEY_DELETED_FILES, &deleted)?;

        Ok(Some(removed))
    }

    pub fn deleted_files(&self) -> Result<Vec<DeletedFile>> {
        Ok(self.read(KEY_DELETED_FILES)?.unwrap_or_default())
    }

    // -- Tool settings cache --------------------------------------------------

    pub fn watermark_settings(&self) -> Result<WatermarkSettings> {
        Ok(self.read(KEY_WATERMARK)?.unwrap_or_default())
    }

    pub fn set_watermark_settings(&self, settings: &WatermarkSettings) -> Result<()> {
        self.write(KEY_WATERMARK, settings)
    }

    pub fn page_number_settings(&self) -> Result<PageNumberSettings> {
        Ok(self.read(KEY_PAGE_NUMBERS)?.unwrap_or_default())
    }

    pub fn set_page_number_settings(&self, settings: &PageNumberSettings) -> Result<()> {
        self.write(KEY_PAGE_NUMBERS, settings)
    }

    /// Compression target as typed by the user (e.g. `"1MB"`).
    pub fn target_size(&self) -> Result<Option<String>> {
        self.read(KEY_TARGET_SIZE)
    }

    pub fn set_target_size(&self, target: &str) -> Result<()> {
        self.write(KEY_TARGET_SIZE, &target)
    }

    /// Forget everything.
    pub fn reset(&self) -> Result<()> {
        self.store.clear()
    }
}
