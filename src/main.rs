// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Background download worker
//!
//! Periodically checks the users collection and downloads all Graph data for
//! every user that has signed on but not yet been downloaded.

use anyhow::Context;
use clap::Parser;
use graph_harvester::{
    config::{Config, DEFAULT_SETTINGS_PATH},
    db::FirestoreDb,
    services::{GraphClient, PollLoop, UserDownloader},
    store::ConfiguredStore,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "graph-harvester",
    version,
    about = "Download Graph API data for newly signed-on users",
    long_about = "Download Graph API data for newly signed-on users.\n\n\
                  Run a single instance per record store: concurrent workers \
                  can pick up and download the same pending user."
)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, env = "HARVESTER_CONFIG", default_value = DEFAULT_SETTINGS_PATH)]
    config_file: PathBuf,

    /// Time (in seconds) to wait before re-checking an empty queue
    #[arg(short, long, default_value_t = 300)]
    sleep_time: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    graph_harvester::init_logging();

    let config = Config::load(&cli.config_file)
        .with_context(|| format!("Failed to load {}", cli.config_file.display()))?;

    tracing::info!(
        project = %config.record_store.project_id,
        collection = %config.record_store.users_collection,
        "Queue location"
    );

    let db = FirestoreDb::new(&config.record_store)
        .await
        .context("Failed to connect to record store")?;

    tracing::info!(store_class = config.data_store.store_class(), "Data store selected");
    let store = ConfiguredStore::from_config(&config.data_store, &db);

    let downloader = UserDownloader::new(GraphClient::new(&config.graph.base_url), store);
    let poller = PollLoop::new(db, downloader, Duration::from_secs(cli.sleep_time));

    tokio::select! {
        result = poller.run() => {
            result.context("Download worker stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
