// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Graph metadata introspection (`?metadata=1`).

use serde::Deserialize;
use std::collections::BTreeMap;

/// Substring that excludes a profile field from download.
const EXCLUDED_FIELD_MARKER: &str = "business";

/// Edges that are never downloaded.
pub const SKIPPED_EDGES: &[&str] = &["picture"];

/// Response to `GET /me?metadata=1`. Only the `metadata` object is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataResponse {
    pub metadata: MetadataDescriptor,
}

/// Fields and edges available on a profile, as reported by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataDescriptor {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Edge name -> endpoint link
    #[serde(default)]
    pub connections: BTreeMap<String, String>,
}

/// A scalar profile field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
}

impl MetadataDescriptor {
    /// Field names to request for the profile, without business fields.
    pub fn profile_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| !name.contains(EXCLUDED_FIELD_MARKER))
            .collect()
    }
}

/// Whether an edge is excluded from download.
pub fn is_skipped_edge(name: &str) -> bool {
    SKIPPED_EDGES.contains(&name)
}
