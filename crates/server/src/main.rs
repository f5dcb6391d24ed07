//! # sheetsift-server
//!
//! HTTP server for uploading a workbook, selecting one of its sheets and
//! searching the sheet's rows.

mod config;
mod error;
mod routes;

use anyhow::{Context, Result};
use clap::Parser;
use config::ServerConfig;
use routes::{create_router, AppState};
use sheetsift_sheet::Session;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    let state = AppState::new(
        Session::new(),
        config.serialize_options(),
        config.max_upload_bytes,
    );
    let app = create_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("sheetsift-server listening on {addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
