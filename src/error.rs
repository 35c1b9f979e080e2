// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type shared by the worker and the sign-on server.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Graph API error: {0}")]
    GraphApi(String),

    #[error("User record has no usable credential: {0}")]
    MissingCredential(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Data store error: {0}")]
    DataStore(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when the Graph API rejects the access token.
    pub const GRAPH_TOKEN_ERROR: &'static str = "Graph API rejected the access token";

    /// Message used when the Graph API reports throttling.
    pub const GRAPH_RATE_LIMIT: &'static str = "Graph API rate limit reached";

    /// Returns true if this error means the user's credential is expired or revoked.
    pub fn is_graph_token_error(&self) -> bool {
        match self {
            AppError::GraphApi(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("access token") || msg.contains("expired")
            }
            _ => false,
        }
    }

    /// Returns true if the error comes from the record store or data store.
    ///
    /// These end the worker process instead of failing a single user.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::DataStore(_))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::GraphApi(msg) => (StatusCode::BAD_GATEWAY, "graph_error", Some(msg.clone())),
            AppError::MissingCredential(msg) => {
                (StatusCode::UNAUTHORIZED, "missing_credential", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::DataStore(msg) => {
                tracing::error!(error = %msg, "Data store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "data_store_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AppError>;
