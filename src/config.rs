// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from a YAML settings file.
//!
//! The file is read once at startup. Any key can be overridden from the
//! environment with a `HARVESTER__` prefix and `__` as the section separator,
//! e.g. `HARVESTER__SIGNON__APP_SECRET`.

use crate::db::collections;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.yml";

/// Application configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    /// Where user records (the download queue) live
    #[validate(nested)]
    pub record_store: RecordStoreConfig,
    /// Where downloaded artifacts are written
    pub data_store: DataStoreConfig,
    /// Graph API endpoints
    #[serde(default)]
    #[validate(nested)]
    pub graph: GraphConfig,
    /// Sign-on server settings (only required by the `signon` binary)
    #[serde(default)]
    #[validate(nested)]
    pub signon: Option<SignOnConfig>,
}

/// Firestore record store settings.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordStoreConfig {
    /// GCP project ID
    #[validate(length(min = 1))]
    pub project_id: String,
    /// Collection holding user records
    #[serde(default = "default_users_collection")]
    #[validate(length(min = 1))]
    pub users_collection: String,
    /// Collection holding denied sign-on attempts
    #[serde(default = "default_denied_collection")]
    #[validate(length(min = 1))]
    pub denied_collection: String,
}

/// Data store backend, selected by `store_class` and parameterized by `store_params`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "store_class",
    content = "store_params",
    rename_all = "snake_case"
)]
pub enum DataStoreConfig {
    /// One file per artifact below `root`
    Filesystem { root: PathBuf },
    /// One Firestore document per artifact
    Firestore {
        #[serde(default = "default_artifacts_collection")]
        collection: String,
    },
    /// In-process map, lost on exit
    Memory,
}

impl DataStoreConfig {
    /// Configured backend name, as written in the settings file.
    pub fn store_class(&self) -> &'static str {
        match self {
            DataStoreConfig::Filesystem { .. } => "filesystem",
            DataStoreConfig::Firestore { .. } => "firestore",
            DataStoreConfig::Memory => "memory",
        }
    }
}

/// Graph API endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GraphConfig {
    /// Versioned API root, e.g. `https://graph.facebook.com/v2.5`
    #[serde(default = "default_graph_base_url")]
    #[validate(url)]
    pub base_url: String,
    /// OAuth login dialog
    #[serde(default = "default_dialog_url")]
    #[validate(url)]
    pub dialog_url: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            dialog_url: default_dialog_url(),
        }
    }
}

/// Sign-on server settings.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignOnConfig {
    /// Facebook app ID (public)
    #[validate(length(min = 1))]
    pub app_id: String,
    /// Facebook app secret
    #[validate(length(min = 1))]
    pub app_secret: String,
    /// OAuth scopes requested from the user
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Public base URL of this server, used to build the OAuth callback
    #[validate(url)]
    pub url: String,
    /// HMAC key for the OAuth `state` parameter
    #[validate(length(min = 16))]
    pub oauth_state_key: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl SignOnConfig {
    /// Comma-joined scope list for the login dialog.
    pub fn scope(&self) -> String {
        self.permissions.join(",")
    }

    /// OAuth redirect target registered with the Graph app.
    pub fn callback_url(&self) -> String {
        format!("{}/auth/facebook/callback", self.url.trim_end_matches('/'))
    }
}

fn default_users_collection() -> String {
    collections::USERS.to_string()
}

fn default_denied_collection() -> String {
    collections::DENIED_SIGNONS.to_string()
}

fn default_artifacts_collection() -> String {
    collections::ARTIFACTS.to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com/v2.5".to_string()
}

fn default_dialog_url() -> String {
    "https://www.facebook.com/dialog/oauth".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            record_store: RecordStoreConfig {
                project_id: "test-project".to_string(),
                users_collection: default_users_collection(),
                denied_collection: default_denied_collection(),
            },
            data_store: DataStoreConfig::Memory,
            graph: GraphConfig::default(),
            signon: Some(SignOnConfig {
                app_id: "test_app_id".to_string(),
                app_secret: "test_secret".to_string(),
                permissions: vec!["public_profile".to_string(), "user_posts".to_string()],
                url: "http://localhost:8080".to_string(),
                oauth_state_key: "test_state_key_32_bytes_minimum!".to_string(),
                port: 8080,
            }),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file plus `HARVESTER__*` environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(config::Environment::with_prefix("HARVESTER").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Sign-on settings, required by the `signon` binary.
    pub fn signon(&self) -> Result<&SignOnConfig, ConfigError> {
        self.signon.as_ref().ok_or(ConfigError::Missing("signon"))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing required settings section: {0}")]
    Missing(&'static str),

    #[error("Failed to read settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
