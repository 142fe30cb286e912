// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared state handed to every route handler.

use std::sync::Arc;

use docuhub_core::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Largest request body accepted: the upload cap after base64 expansion,
    /// plus room for the JSON envelope and a data-URL prefix.
    pub fn body_limit(&self) -> usize {
        let encoded = self.config.max_upload_bytes.div_ceil(3) * 4;
        usize::try_from(encoded).unwrap_or(usize::MAX).saturating_add(4096)
    }
}
