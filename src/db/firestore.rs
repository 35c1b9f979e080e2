// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (sign-on records, doubling as the download queue)
//! - Denied sign-ons
//! - Artifacts (when the data store backend is `firestore`)

use crate::config::RecordStoreConfig;
use crate::db::UserQueue;
use crate::error::AppError;
use crate::models::{DeniedSignOn, UserRecord};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use firestore::paths;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    users_collection: String,
    denied_collection: String,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(config: &RecordStoreConfig) -> Result<Self, AppError> {
        let project_id = config.project_id.as_str();

        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings.
        let client = if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            Self::create_emulator_client(project_id).await?
        } else {
            let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
                AppError::Database(format!("Failed to connect to Firestore: {}", e))
            })?;
            tracing::info!(project = project_id, "Connected to Firestore");
            client
        };

        Ok(Self {
            client: Some(client),
            users_collection: config.users_collection.clone(),
            denied_collection: config.denied_collection.clone(),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(client)
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            users_collection: crate::db::collections::USERS.to_string(),
            denied_collection: crate::db::collections::DENIED_SIGNONS.to_string(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Store a freshly signed-on user under a new document ID.
    ///
    /// Returns the generated ID. The record is pending until marked complete.
    pub async fn insert_user(&self, record: &UserRecord) -> Result<String, AppError> {
        let doc_id = uuid::Uuid::new_v4().to_string();

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(&self.users_collection)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc_id)
    }

    /// Get a user record by document ID.
    pub async fn get_user(&self, doc_id: &str) -> Result<Option<UserRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(&self.users_collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the most recent sign-on of a Graph user.
    ///
    /// Only an equality filter is sent so the automatic single-field index
    /// suffices; the newest match is picked here.
    pub async fn find_user_by_graph_id(
        &self,
        graph_user_id: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let graph_user_id = graph_user_id.to_string();

        let records: Vec<UserRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(self.users_collection.as_str())
            .filter(move |q| q.for_all([q.field("user.id").eq(graph_user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(latest_sign_on(records))
    }

    /// Record a declined sign-on.
    pub async fn insert_denied(&self, denied: &DeniedSignOn) -> Result<(), AppError> {
        let doc_id = uuid::Uuid::new_v4().to_string();

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(&self.denied_collection)
            .document_id(&doc_id)
            .object(denied)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ─── Artifact Operations ─────────────────────────────────────

    /// Write a serialized document, replacing any previous one.
    pub async fn set_document<T>(&self, collection: &str, doc_id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Read a document as `T`.
    pub async fn get_document<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub fn users_collection(&self) -> &str {
        &self.users_collection
    }
}

/// Newest record by `created_at` (RFC 3339 strings sort chronologically).
fn latest_sign_on(records: Vec<UserRecord>) -> Option<UserRecord> {
    records.into_iter().max_by(|a, b| a.created_at.cmp(&b.created_at))
}

impl UserQueue for FirestoreDb {
    /// Firestore cannot match documents lacking a field, so the whole
    /// collection is read and filtered here. Order is whatever the query
    /// returns. Documents that are not user records are logged and skipped.
    async fn list_pending(&self) -> Result<Vec<UserRecord>, AppError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(self.users_collection.as_str())
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs
            .iter()
            .filter_map(
                |doc| match firestore::FirestoreDb::deserialize_doc_to::<UserRecord>(doc) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(document = %doc.name, error = %e, "Skipping unreadable user record");
                        None
                    }
                },
            )
            .filter(UserRecord::is_pending)
            .collect())
    }

    /// Only the `downloaded` field is written; everything else in the
    /// document is left as it is.
    async fn mark_complete(&self, doc_id: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let client = self.get_client()?;

        let existing = client
            .fluent()
            .select()
            .by_id_in(&self.users_collection)
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if existing.is_none() {
            tracing::warn!(doc_id, "No user record to mark complete");
            return Ok(false);
        }

        let marker = CompletionMarker {
            downloaded: format_utc_rfc3339(at),
        };

        let _: () = client
            .fluent()
            .update()
            .fields(paths!(CompletionMarker::{downloaded}))
            .in_col(&self.users_collection)
            .document_id(doc_id)
            .object(&marker)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }
}

/// The one field the worker ever writes to a user record.
#[derive(Serialize, Deserialize)]
struct CompletionMarker {
    downloaded: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_on(created_at: &str, name: &str) -> UserRecord {
        UserRecord {
            doc_id: None,
            respondent_id: "NA".to_string(),
            user: Some(crate::models::GraphUser {
                id: "U1".to_string(),
                name: name.to_string(),
            }),
            token: None,
            permissions: None,
            created_at: created_at.to_string(),
            downloaded: None,
        }
    }

    #[test]
    fn test_latest_sign_on_wins() {
        let records = vec![
            signed_on("2026-01-05T00:00:00Z", "middle"),
            signed_on("2026-02-01T00:00:00Z", "newest"),
            signed_on("2025-12-31T23:59:59Z", "oldest"),
        ];

        let latest = latest_sign_on(records).unwrap();
        assert_eq!(latest.user.unwrap().name, "newest");
        assert!(latest_sign_on(Vec::new()).is_none());
    }
}
