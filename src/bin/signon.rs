// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-on server
//!
//! Sends respondents through the Graph OAuth dialog and records their
//! access token as a pending user for the download worker.

use anyhow::Context;
use clap::Parser;
use graph_harvester::{
    config::{Config, DEFAULT_SETTINGS_PATH},
    db::FirestoreDb,
    services::{GraphClient, SignOnService},
    AppState,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "signon", version, about = "Graph OAuth sign-on server")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, env = "HARVESTER_CONFIG", default_value = DEFAULT_SETTINGS_PATH)]
    config_file: PathBuf,

    /// Listen port (overrides signon.port)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    graph_harvester::init_logging();

    let config = Config::load(&cli.config_file)
        .with_context(|| format!("Failed to load {}", cli.config_file.display()))?;
    let signon_config = config.signon()?.clone();
    let port = cli.port.unwrap_or(signon_config.port);

    let db = FirestoreDb::new(&config.record_store)
        .await
        .context("Failed to connect to record store")?;

    let signon = SignOnService::new(
        GraphClient::new(&config.graph.base_url),
        db,
        signon_config,
        &config.graph.dialog_url,
    );

    let state = Arc::new(AppState { signon });
    let app = graph_harvester::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Sign-on server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
