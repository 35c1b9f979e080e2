// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Artifacts as Firestore documents.
//!
//! JSON is kept as text so that nested arrays (which Firestore cannot
//! represent) survive. Raw payloads are base64-encoded. Firestore caps a
//! document at 1 MiB, so long bodies are split across several documents:
//! the first lives at `{key}` and records the part count, the rest at
//! `{key}.part{n}`.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::Artifact;
use crate::store::DataStore;
use crate::time_utils::now_rfc3339;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Largest body slice stored in one document.
pub const MAX_PART_BYTES: usize = 900 * 1024;

/// Stored form of (one part of) an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub key: String,
    /// "json" or "raw"
    pub kind: String,
    /// "json" for JSON text, "base64" for raw bytes
    pub encoding: String,
    /// Zero-based index of this part
    #[serde(default)]
    pub part: u32,
    /// Total number of parts
    #[serde(default = "default_parts")]
    pub parts: u32,
    pub body: String,
    pub stored_at: String,
}

fn default_parts() -> u32 {
    1
}

impl StoredArtifact {
    /// Document ID of part `part` of `key`.
    pub fn doc_id(key: &str, part: u32) -> String {
        if part == 0 {
            key.to_string()
        } else {
            format!("{}.part{}", key, part)
        }
    }

    /// Encode `artifact` into one or more parts, each at most `MAX_PART_BYTES` of body.
    pub fn encode(key: &str, artifact: &Artifact) -> Result<Vec<Self>> {
        let (encoding, body) = match artifact {
            Artifact::Json(value) => (
                "json",
                serde_json::to_string(value)
                    .map_err(|e| AppError::DataStore(format!("Failed to encode {}: {}", key, e)))?,
            ),
            Artifact::Raw(bytes) => ("base64", STANDARD.encode(bytes)),
        };

        let chunks = split_body(&body, MAX_PART_BYTES);
        let parts = u32::try_from(chunks.len())
            .map_err(|_| AppError::DataStore(format!("Artifact {} is too large", key)))?;
        let stored_at = now_rfc3339();

        Ok(chunks
            .into_iter()
            .zip(0..)
            .map(|(chunk, part)| Self {
                key: key.to_string(),
                kind: artifact.kind().to_string(),
                encoding: encoding.to_string(),
                part,
                parts,
                body: chunk.to_string(),
                stored_at: stored_at.clone(),
            })
            .collect())
    }

    /// Reassemble an artifact from all of its parts, in order.
    pub fn decode(parts: &[StoredArtifact]) -> Result<Artifact> {
        let first = parts
            .first()
            .ok_or_else(|| AppError::DataStore("No artifact parts to decode".to_string()))?;

        let complete = parts.len() == first.parts as usize
            && parts.iter().zip(0..).all(|(p, i)| p.part == i && p.key == first.key);
        if !complete {
            return Err(AppError::DataStore(format!(
                "Artifact {} has missing or misordered parts",
                first.key
            )));
        }

        let body: String = parts.iter().map(|p| p.body.as_str()).collect();

        match first.encoding.as_str() {
            "json" => serde_json::from_str(&body)
                .map(Artifact::Json)
                .map_err(|e| AppError::DataStore(format!("Corrupt artifact {}: {}", first.key, e))),
            "base64" => STANDARD
                .decode(&body)
                .map(Artifact::Raw)
                .map_err(|e| AppError::DataStore(format!("Corrupt artifact {}: {}", first.key, e))),
            other => Err(AppError::DataStore(format!(
                "Unknown artifact encoding: {}",
                other
            ))),
        }
    }
}

/// Split `body` into slices of at most `max` bytes, on character boundaries.
fn split_body(body: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = body;

    while rest.len() > max {
        let mut end = max;
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single character wider than `max`
            end = max;
            while !rest.is_char_boundary(end) {
                end += 1;
            }
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}

/// Writes artifacts into a Firestore collection.
#[derive(Clone)]
pub struct FirestoreArtifactStore {
    db: FirestoreDb,
    collection: String,
}

impl FirestoreArtifactStore {
    pub fn new(db: FirestoreDb, collection: String) -> Self {
        Self { db, collection }
    }

    /// Read back a stored artifact, or `None` if `key` was never written.
    pub async fn load(&self, key: &str) -> Result<Option<Artifact>> {
        let map_err = |e: AppError| AppError::DataStore(e.to_string());

        let Some(first) = self
            .db
            .get_document::<StoredArtifact>(&self.collection, key)
            .await
            .map_err(map_err)?
        else {
            return Ok(None);
        };

        let mut parts = vec![first];
        for part in 1..parts[0].parts {
            let doc_id = StoredArtifact::doc_id(key, part);
            let stored = self
                .db
                .get_document::<StoredArtifact>(&self.collection, &doc_id)
                .await
                .map_err(map_err)?
                .ok_or_else(|| AppError::DataStore(format!("Missing artifact part {}", doc_id)))?;
            parts.push(stored);
        }

        StoredArtifact::decode(&parts).map(Some)
    }
}

impl DataStore for FirestoreArtifactStore {
    async fn store_object(&self, key: &str, artifact: &Artifact) -> Result<()> {
        let parts = StoredArtifact::encode(key, artifact)?;

        // Continuation parts first, so the head document never points at
        // parts that were not written.
        for doc in parts.iter().rev() {
            self.db
                .set_document(&self.collection, &StoredArtifact::doc_id(key, doc.part), doc)
                .await
                .map_err(|e| AppError::DataStore(e.to_string()))?;
        }

        tracing::debug!(
            key,
            collection = %self.collection,
            kind = artifact.kind(),
            parts = parts.len(),
            "Artifact stored"
        );
        Ok(())
    }
}
