// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DocuHub — Core types, errors, configuration and preferences shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod prefs;
pub mod session;
pub mod stamp;
pub mod types;
pub mod upload;

pub use config::AppConfig;
pub use error::DocuhubError;
pub use types::*;
