// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Downloaded artifacts written to the data store.

/// A downloaded profile or edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Parsed JSON (profile object, or concatenated edge pages)
    Json(serde_json::Value),
    /// Response body that was not JSON, kept unchanged
    Raw(Vec<u8>),
}

impl Artifact {
    /// Short label for logs and stored metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Json(_) => "json",
            Artifact::Raw(_) => "raw",
        }
    }

    /// Number of items for JSON arrays, bytes for raw payloads.
    pub fn len_hint(&self) -> usize {
        match self {
            Artifact::Json(serde_json::Value::Array(items)) => items.len(),
            Artifact::Json(_) => 1,
            Artifact::Raw(bytes) => bytes.len(),
        }
    }
}

/// Data store key for one category of a user's data.
pub fn artifact_key(user_id: &str, category: &str) -> String {
    format!("{}.{}", user_id, category)
}
