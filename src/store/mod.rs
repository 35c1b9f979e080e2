// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data store backends for downloaded artifacts.
//!
//! The backend is chosen by the `store_class` setting. Every backend only
//! needs to support a single write operation.

pub mod filesystem;
pub mod firestore;
pub mod memory;

pub use self::filesystem::FilesystemStore;
pub use self::firestore::FirestoreArtifactStore;
pub use self::memory::MemoryStore;

use crate::config::DataStoreConfig;
use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::Artifact;
use std::future::Future;

/// Write-only sink for artifacts keyed by `"{user_id}.{category}"`.
pub trait DataStore: Send + Sync {
    /// Store `artifact` under `key`, replacing any earlier value.
    fn store_object(
        &self,
        key: &str,
        artifact: &Artifact,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// The backend selected in configuration.
#[derive(Clone)]
pub enum ConfiguredStore {
    Filesystem(FilesystemStore),
    Firestore(FirestoreArtifactStore),
    Memory(MemoryStore),
}

impl ConfiguredStore {
    /// Build the configured backend. `db` is only used by the `firestore` backend.
    pub fn from_config(config: &DataStoreConfig, db: &FirestoreDb) -> Self {
        match config {
            DataStoreConfig::Filesystem { root } => {
                ConfiguredStore::Filesystem(FilesystemStore::new(root.clone()))
            }
            DataStoreConfig::Firestore { collection } => ConfiguredStore::Firestore(
                FirestoreArtifactStore::new(db.clone(), collection.clone()),
            ),
            DataStoreConfig::Memory => ConfiguredStore::Memory(MemoryStore::new()),
        }
    }
}

impl DataStore for ConfiguredStore {
    async fn store_object(&self, key: &str, artifact: &Artifact) -> Result<()> {
        match self {
            ConfiguredStore::Filesystem(store) => store.store_object(key, artifact).await,
            ConfiguredStore::Firestore(store) => store.store_object(key, artifact).await,
            ConfiguredStore::Memory(store) => store.store_object(key, artifact).await,
        }
    }
}
