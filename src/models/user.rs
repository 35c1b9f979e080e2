// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User record model shared by the sign-on server and the download queue.

use serde::{Deserialize, Serialize};

/// A signed-on user, stored in the `users` collection.
///
/// A record is pending until `downloaded` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Record identifier (Firestore document ID)
    #[serde(default, alias = "_firestore_id", skip_serializing)]
    pub doc_id: Option<String>,
    /// Survey respondent this sign-on belongs to ("NA" when unknown)
    pub respondent_id: String,
    /// Graph user object returned by `me`
    #[serde(default)]
    pub user: Option<GraphUser>,
    /// Access credential (extended when possible)
    #[serde(default)]
    pub token: Option<AccessCredential>,
    /// Raw `me/permissions` response
    #[serde(default)]
    pub permissions: Option<serde_json::Value>,
    /// When the user signed on (RFC 3339)
    pub created_at: String,
    /// Completion marker (RFC 3339), absent while pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<String>,
}

impl UserRecord {
    /// Whether this record still needs its data downloaded.
    pub fn is_pending(&self) -> bool {
        self.downloaded.is_none()
    }

    /// External Graph user ID, if the record carries a user object.
    pub fn graph_user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// Minimal Graph user object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// OAuth access token as returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessCredential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime in seconds, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// A sign-on attempt the user declined.
///
/// Kept apart from `users` so the download queue never sees a record
/// without a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeniedSignOn {
    pub respondent_id: String,
    /// Always "DENIED"
    pub permissions: String,
    /// Error reason reported by the login dialog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
}

impl DeniedSignOn {
    pub fn new(respondent_id: &str, error: Option<String>, created_at: String) -> Self {
        Self {
            respondent_id: respondent_id.to_string(),
            permissions: "DENIED".to_string(),
            error,
            created_at,
        }
    }
}
