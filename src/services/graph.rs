// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Graph API client.
//!
//! Handles:
//! - Object and edge reads (`get_object`)
//! - Metadata introspection (`?metadata=1`)
//! - Raw reads of edge and pagination links
//! - OAuth code exchange and long-lived token extension

use crate::error::AppError;
use crate::models::{AccessCredential, MetadataDescriptor, MetadataResponse};
use serde::Deserialize;

/// Graph API client, optionally bound to a user's access token.
#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl GraphClient {
    /// Create an unauthenticated client for the given API root.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Copy of this client that authenticates as the token's owner.
    pub fn with_token(&self, access_token: &str) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            access_token: Some(access_token.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read an object or edge, e.g. `me` or `me/permissions`.
    pub async fn get_object(
        &self,
        id: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/{}", self.base_url, id.trim_start_matches('/'));
        self.get_json(&url, params).await
    }

    /// Read the self-describing metadata (fields and edges) of an object.
    pub async fn get_metadata(&self, id: &str) -> Result<MetadataDescriptor, AppError> {
        let response = self.get_object(id, &[("metadata", "1")]).await?;

        serde_json::from_value::<MetadataResponse>(response)
            .map(|r| r.metadata)
            .map_err(|e| AppError::GraphApi(format!("Unexpected metadata response: {}", e)))
    }

    /// GET an absolute link (an edge or pagination link) and return the body bytes.
    ///
    /// The access token is only sent to the API's own host. Error messages
    /// omit the URL.
    pub async fn get_raw(&self, link: &str) -> Result<Vec<u8>, AppError> {
        let mut request = self.http.get(link);
        if let Some(token) = self.token_for(link) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::GraphApi(e.without_url().to_string()))?;

        let response = self.check_response(response).await?;

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| AppError::GraphApi(e.without_url().to_string()))
    }

    /// Token to attach to a request for `link`, if it points at the API host.
    fn token_for(&self, link: &str) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        let link = reqwest::Url::parse(link).ok()?;
        let base = reqwest::Url::parse(&self.base_url).ok()?;

        let same_origin = link.scheme() == base.scheme()
            && link.host_str() == base.host_str()
            && link.port_or_known_default() == base.port_or_known_default();
        same_origin.then_some(token)
    }

    /// Exchange an authorization code for a short-lived access token.
    pub async fn exchange_code(
        &self,
        app_id: &str,
        app_secret: &str,
        redirect_uri: &str,
        code: &str,
    ) -> Result<AccessCredential, AppError> {
        let url = format!("{}/oauth/access_token", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("client_id", app_id),
                ("client_secret", app_secret),
                ("redirect_uri", redirect_uri),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AppError::GraphApi(format!("Token exchange failed: {}", e.without_url())))?;

        self.check_response_json(response).await
    }

    /// Trade a short-lived token for a long-lived one.
    pub async fn extend_token(
        &self,
        app_id: &str,
        app_secret: &str,
        short_lived_token: &str,
    ) -> Result<AccessCredential, AppError> {
        let url = format!("{}/oauth/access_token", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", app_id),
                ("client_secret", app_secret),
                ("fb_exchange_token", short_lived_token),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::GraphApi(format!("Token extension failed: {}", e.without_url()))
            })?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let mut request = self.http.get(url).query(params);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::GraphApi(e.without_url().to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let response = self.check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| AppError::GraphApi(format!("JSON parse error: {}", e.without_url())))
    }
}

/// Error body returned by the Graph API.
#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    code: i64,
}

/// Graph error codes that signal throttling.
const RATE_LIMIT_CODES: &[i64] = &[4, 17, 32, 613];

/// Graph error code for an invalid or expired access token.
const INVALID_TOKEN_CODE: i64 = 190;

/// Map a failed response to an `AppError`.
fn classify_error(status: reqwest::StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<GraphErrorBody>(body).ok().map(|b| b.error);

    if status.as_u16() == 429 || detail.as_ref().is_some_and(|d| RATE_LIMIT_CODES.contains(&d.code)) {
        tracing::warn!(status = %status, "Graph API rate limit hit");
        return AppError::GraphApi(AppError::GRAPH_RATE_LIMIT.to_string());
    }

    if status.as_u16() == 401 || detail.as_ref().is_some_and(|d| d.code == INVALID_TOKEN_CODE) {
        return AppError::GraphApi(AppError::GRAPH_TOKEN_ERROR.to_string());
    }

    match detail {
        Some(d) => AppError::GraphApi(format!(
            "HTTP {}: {} ({}, code {})",
            status, d.message, d.kind, d.code
        )),
        None => AppError::GraphApi(format!("HTTP {}: {}", status, body)),
    }
}
