// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docuhub-server — HTTP front for PDF compression.

pub mod errors;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use routes::build_router;
pub use state::AppState;
