// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docuhub-server entry point.

use anyhow::{Context, Result};
use docuhub_core::AppConfig;
use docuhub_core::config::data_dir;
use docuhub_server::{AppState, build_router};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load_or_default(&data_dir()).with_env_overrides();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        max_upload_bytes = config.max_upload_bytes,
        "DocuHub server starting"
    );

    let app = build_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("DocuHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
