// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! graph-harvester: download Graph API profile data for signed-on users
//!
//! Two binaries share this crate:
//! - `signon` records a user's access token when they grant access
//! - `graph-harvester` polls for those users and downloads their profile
//!   and every edge into a configurable data store

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use services::SignOnService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shared state of the sign-on server.
pub struct AppState {
    pub signon: SignOnService,
}

/// Initialize structured JSON logging.
pub fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("graph_harvester=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
