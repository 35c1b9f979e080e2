// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User data download.
//!
//! Handles the per-user workflow:
//! 1. Read profile metadata to discover fields and edges
//! 2. Download the profile with every non-business field
//! 3. Download every edge except `picture`, following pagination
//! 4. Write each result to the data store as `{user_id}.{category}`

use crate::error::{AppError, Result};
use crate::models::metadata::is_skipped_edge;
use crate::models::{artifact_key, Artifact, UserRecord};
use crate::services::paging::fetch_all;
use crate::services::GraphClient;
use crate::store::DataStore;

/// Category name of the profile artifact.
const PROFILE_CATEGORY: &str = "profile";

/// Downloads one user's profile and edges into a data store.
pub struct UserDownloader<S> {
    graph: GraphClient,
    store: S,
}

impl<S: DataStore> UserDownloader<S> {
    pub fn new(graph: GraphClient, store: S) -> Self {
        Self { graph, store }
    }

    /// Download everything available for `record`.
    ///
    /// Returns `Ok(true)` once the profile and every edge are stored. Any
    /// failure aborts the download; artifacts already written stay in place.
    pub async fn download(&self, record: &UserRecord) -> Result<bool> {
        let (user, token) = match (&record.user, &record.token) {
            (Some(user), Some(token)) => (user, token),
            _ => {
                return Err(AppError::MissingCredential(format!(
                    "record {} (respondent {})",
                    record.doc_id.as_deref().unwrap_or("<unsaved>"),
                    record.respondent_id
                )))
            }
        };
        let user_id = user.id.as_str();

        tracing::info!(user_id, "Downloading data for user into data store");
        let graph = self.graph.with_token(&token.access_token);

        tracing::info!(user_id, "Reading user metadata to determine fields to download");
        let metadata = graph.get_metadata("me").await?;
        let fields = metadata.profile_fields();

        tracing::info!(user_id, fields = fields.len(), "Downloading profile");
        let profile = graph
            .get_object("me", &[("fields", fields.join(",").as_str())])
            .await?;
        self.store
            .store_object(&artifact_key(user_id, PROFILE_CATEGORY), &Artifact::Json(profile))
            .await?;
        tracing::info!(user_id, "Profile saved to data store");

        for (edge, link) in &metadata.connections {
            if is_skipped_edge(edge) {
                tracing::info!(user_id, edge = %edge, "Skipping graph edge");
                continue;
            }

            tracing::info!(user_id, edge = %edge, "Downloading all data for graph edge");
            let artifact = fetch_all(&graph, link).await?;
            let size = artifact.len_hint();
            let kind = artifact.kind();

            self.store
                .store_object(&artifact_key(user_id, edge), &artifact)
                .await?;
            tracing::info!(user_id, edge = %edge, kind, size, "Edge saved to data store");
        }

        tracing::info!(user_id, "All fields and edges in user metadata stored");
        Ok(true)
    }
}
