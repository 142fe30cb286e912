// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tool sessions: the uploaded file travels from the upload step to the
// processing step inside an explicit session object, and per-tool UI state
// is kept in a session-scoped store for restore-on-navigation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DocuhubError, Result};
use crate::prefs::UserPreferencesStore;
use crate::types::{DocumentType, ToolId};
use crate::upload::{FileMeta, fingerprint, validate_upload};

/// Prefix of tool-state keys: `docuhub-tool-state-{toolId}`.
pub const TOOL_STATE_PREFIX: &str = "docuhub-tool-state";

/// An uploaded file held by a session.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub meta: FileMeta,
    pub document_type: DocumentType,
    pub data: Vec<u8>,
    /// SHA-256 of `data`.
    pub fingerprint: String,
}

/// Lifecycle: created on upload, the file is consumed by processing, and the
/// session is dropped on completion or navigation away.
#[derive(Debug)]
pub struct ToolSession {
    id: Uuid,
    tool: ToolId,
    created_at: DateTime<Utc>,
    file: Option<StoredFile>,
}

impl ToolSession {
    /// Validate an upload and open a session holding it.
    pub fn open(tool: ToolId, name: &str, data: Vec<u8>, max_upload_bytes: u64) -> Result<Self> {
        let meta = FileMeta::new(name, data.len() as u64);
        let document_type = validate_upload(tool, &meta, max_upload_bytes)?;
        let file = StoredFile {
            fingerprint: fingerprint(&data),
            meta,
            document_type,
            data,
        };

        let session = Self {
            id: Uuid::new_v4(),
            tool,
            created_at: Utc::now(),
            file: Some(file),
        };
        info!(session = %session.id, tool = %tool, name, "tool session opened");
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tool(&self) -> ToolId {
        self.tool
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Metadata of the held file, if it has not been consumed yet.
    pub fn file_meta(&self) -> Option<&FileMeta> {
        self.file.as_ref().map(|file| &file.meta)
    }

    /// Borrow the held file without consuming it.
    pub fn file(&self) -> Result<&StoredFile> {
        self.file.as_ref().ok_or(DocuhubError::NoActiveSession)
    }

    /// Hand the file to the processing step. A second call fails.
    pub fn take_file(&mut self) -> Result<StoredFile> {
        let file = self.file.take().ok_or(DocuhubError::NoActiveSession)?;
        debug!(session = %self.id, name = %file.meta.name, "file handed to processing");
        Ok(file)
    }

    pub fn is_consumed(&self) -> bool {
        self.file.is_none()
    }
}

/// Holds at most one active session. Starting a new one replaces the old.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<ToolSession>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new session, discarding any previous one. Dropping a session
    /// whose file was never processed is logged.
    pub fn begin(&mut self, session: ToolSession) -> &mut ToolSession {
        if let Some(previous) = self.current.take() {
            if !previous.is_consumed() {
                warn!(session = %previous.id, "replacing unfinished tool session");
            }
        }
        self.current.insert(session)
    }

    pub fn current(&mut self) -> Result<&mut ToolSession> {
        self.current.as_mut().ok_or(DocuhubError::NoActiveSession)
    }

    /// End the current session (processing finished or user navigated away).
    pub fn finish(&mut self) -> Option<ToolSession> {
        let session = self.current.take();
        if let Some(ref finished) = session {
            debug!(session = %finished.id, "tool session finished");
        }
        session
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

/// Per-tool UI state restored when the user comes back to a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    #[serde(rename = "fileMeta", default, skip_serializing_if = "Option::is_none")]
    pub file_meta: Option<FileMeta>,
}

/// Session-scoped tool state on top of any key/value store.
pub struct ToolStateStore<'a, S: UserPreferencesStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: UserPreferencesStore + ?Sized> ToolStateStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn key(tool: ToolId) -> String {
        format!("{TOOL_STATE_PREFIX}-{tool}")
    }

    pub fn save(&self, tool: ToolId, state: &ToolState) -> Result<()> {
        self.store.set(&Self::key(tool), serde_json::to_value(state)?)
    }

    /// Load saved state; unreadable state is logged and treated as absent.
    pub fn load(&self, tool: ToolId) -> Result<Option<ToolState>> {
        let Some(value) = self.store.get(&Self::key(tool))? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                warn!(tool = %tool, %err, "failed to load tool state");
                Ok(None)
            }
        }
    }

    pub fn clear(&self, tool: ToolId) -> Result<()> {
        self.store.remove(&Self::key(tool))
    }
}
