// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Artifacts as files: `{root}/{key}.json` or `{root}/{key}.raw`.

use crate::error::{AppError, Result};
use crate::models::Artifact;
use crate::store::DataStore;
use std::path::PathBuf;

/// Writes one file per artifact below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// File path for `key`. Keys must stay inside the root directory.
    pub fn path_for(&self, key: &str, artifact: &Artifact) -> Result<PathBuf> {
        validate_key(key)?;
        let extension = match artifact {
            Artifact::Json(_) => "json",
            Artifact::Raw(_) => "raw",
        };
        Ok(self.root.join(format!("{}.{}", key, extension)))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('.')
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
    {
        return Err(AppError::DataStore(format!("Invalid artifact key: {:?}", key)));
    }
    Ok(())
}

impl DataStore for FilesystemStore {
    async fn store_object(&self, key: &str, artifact: &Artifact) -> Result<()> {
        let path = self.path_for(key, artifact)?;

        let bytes = match artifact {
            Artifact::Json(value) => serde_json::to_vec_pretty(value)
                .map_err(|e| AppError::DataStore(format!("Failed to encode {}: {}", key, e)))?,
            Artifact::Raw(bytes) => bytes.clone(),
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::DataStore(format!(
                "Failed to create {}: {}",
                self.root.display(),
                e
            ))
        })?;

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::DataStore(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(key, path = %path.display(), bytes = bytes.len(), "Artifact written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_json_artifact_written_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().join("out"));

        store
            .store_object("U1.feed", &Artifact::Json(json!([{"id": "1"}])))
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("out/U1.feed.json")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(value, json!([{"id": "1"}]));
    }

    #[tokio::test]
    async fn test_raw_artifact_written_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());
        let payload = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];

        store
            .store_object("U1.photos", &Artifact::Raw(payload.clone()))
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("U1.photos.raw")).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_rewrite_overwrites_previous_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        store
            .store_object("U1.profile", &Artifact::Json(json!({"name": "old"})))
            .await
            .unwrap();
        store
            .store_object("U1.profile", &Artifact::Json(json!({"name": "new"})))
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("U1.profile.json")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(value["name"], "new");
    }

    #[test]
    fn test_keys_cannot_escape_root() {
        let store = FilesystemStore::new(PathBuf::from("/data"));
        let artifact = Artifact::Raw(vec![]);

        assert!(store.path_for("../etc.passwd", &artifact).is_err());
        assert!(store.path_for("a/b", &artifact).is_err());
        assert!(store.path_for(".hidden", &artifact).is_err());
        assert!(store.path_for("", &artifact).is_err());
        assert_eq!(
            store.path_for("10001.feed", &artifact).unwrap(),
            PathBuf::from("/data/10001.feed.raw")
        );
    }
}
