// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-on: turns an OAuth authorization code into a pending user record.

use crate::config::SignOnConfig;
use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{AccessCredential, DeniedSignOn, GraphUser, UserRecord};
use crate::services::GraphClient;
use crate::time_utils::now_rfc3339;

/// Result of a completed sign-on.
#[derive(Debug, Clone)]
pub struct SignOnResult {
    pub doc_id: String,
    pub user_id: String,
    pub name: String,
}

/// Sign-on flow against the Graph API, recording users in Firestore.
#[derive(Clone)]
pub struct SignOnService {
    graph: GraphClient,
    db: FirestoreDb,
    config: SignOnConfig,
    dialog_url: String,
}

impl SignOnService {
    pub fn new(graph: GraphClient, db: FirestoreDb, config: SignOnConfig, dialog_url: &str) -> Self {
        Self {
            graph,
            db,
            config,
            dialog_url: dialog_url.to_string(),
        }
    }

    pub fn config(&self) -> &SignOnConfig {
        &self.config
    }

    /// Login dialog URL carrying the signed `state`.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.dialog_url,
            urlencoding::encode(&self.config.app_id),
            urlencoding::encode(&self.config.callback_url()),
            urlencoding::encode(&self.config.scope()),
            state
        )
    }

    /// Handle OAuth callback: exchange the code, extend the token, store the user.
    ///
    /// The stored record is pending and will be picked up by the download worker.
    pub async fn handle_oauth_callback(
        &self,
        code: &str,
        respondent_id: &str,
    ) -> Result<SignOnResult> {
        let short_lived = self
            .graph
            .exchange_code(
                &self.config.app_id,
                &self.config.app_secret,
                &self.config.callback_url(),
                code,
            )
            .await?;

        let token = self.extend_or_keep(short_lived).await;
        let graph = self.graph.with_token(&token.access_token);

        let user: GraphUser = serde_json::from_value(graph.get_object("me", &[]).await?)
            .map_err(|e| AppError::GraphApi(format!("Unexpected `me` response: {}", e)))?;
        let permissions = graph.get_object("me/permissions", &[]).await?;

        let record = UserRecord {
            doc_id: None,
            respondent_id: respondent_id.to_string(),
            user: Some(user.clone()),
            token: Some(token),
            permissions: Some(permissions),
            created_at: now_rfc3339(),
            downloaded: None,
        };

        let doc_id = self.db.insert_user(&record).await?;

        tracing::info!(
            doc_id = %doc_id,
            user_id = %user.id,
            respondent_id,
            "Sign-on complete, user queued for download"
        );

        Ok(SignOnResult {
            doc_id,
            user_id: user.id,
            name: user.name,
        })
    }

    /// Long-lived token if the extension succeeds, otherwise the original one.
    async fn extend_or_keep(&self, short_lived: AccessCredential) -> AccessCredential {
        match self
            .graph
            .extend_token(
                &self.config.app_id,
                &self.config.app_secret,
                &short_lived.access_token,
            )
            .await
        {
            Ok(extended) => extended,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to extend access token, keeping short-lived token");
                short_lived
            }
        }
    }

    /// Record that a respondent declined the login dialog.
    pub async fn record_denial(&self, respondent_id: &str, error: Option<String>) -> Result<()> {
        let denied = DeniedSignOn::new(respondent_id, error, now_rfc3339());
        self.db.insert_denied(&denied).await?;
        tracing::info!(respondent_id, "Sign-on denied by user");
        Ok(())
    }

    /// Display name of a signed-on Graph user.
    pub async fn display_name(&self, user_id: &str) -> Result<String> {
        self.db
            .find_user_by_graph_id(user_id)
            .await?
            .and_then(|record| record.user)
            .map(|user| user.name)
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }
}
