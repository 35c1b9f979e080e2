// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facebook OAuth sign-on routes.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Respondent used when the sign-on link carried none.
pub const UNKNOWN_RESPONDENT: &str = "NA";

/// Maximum accepted respondent ID length.
const MAX_RESPONDENT_LEN: usize = 128;

/// How long a signed state stays valid (one hour).
const STATE_MAX_AGE_MS: u128 = 60 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(welcome))
        .route("/welcome/{respondent_id}", get(welcome_with_id))
        .route("/auth/facebook/callback", get(auth_callback))
}

/// Start sign-on without a respondent ID.
async fn welcome(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    auth_start(&state, UNKNOWN_RESPONDENT)
}

/// Start sign-on for a survey respondent.
async fn welcome_with_id(
    State(state): State<Arc<AppState>>,
    Path(respondent_id): Path<String>,
) -> Result<Redirect> {
    if respondent_id.is_empty() || respondent_id.len() > MAX_RESPONDENT_LEN {
        return Err(AppError::BadRequest(format!(
            "respondent id must be 1-{} characters",
            MAX_RESPONDENT_LEN
        )));
    }
    auth_start(&state, &respondent_id)
}

/// Redirect to the login dialog with the respondent signed into `state`.
fn auth_start(state: &AppState, respondent_id: &str) -> Result<Redirect> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let signon = &state.signon;
    let oauth_state = sign_state(
        respondent_id,
        timestamp,
        signon.config().oauth_state_key.as_bytes(),
    )?;
    let auth_url = signon.authorize_url(&oauth_state);

    tracing::info!(
        app_id = %signon.config().app_id,
        respondent_id,
        "Starting OAuth flow, redirecting to login dialog"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_reason: Option<String>,
}

/// OAuth callback - exchange code for a token and queue the user.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let respondent_id = params
        .state
        .as_deref()
        .and_then(|s| {
            verify_and_decode_state(
                s,
                state.signon.config().oauth_state_key.as_bytes(),
                now_ms,
            )
        })
        .unwrap_or_else(|| {
            tracing::warn!("Invalid, expired or missing state parameter, respondent unknown");
            UNKNOWN_RESPONDENT.to_string()
        });

    // User declined, or the dialog failed
    let code = match (params.error, params.code) {
        (None, Some(code)) => code,
        (error, _) => {
            let reason = error.map(|e| match &params.error_reason {
                Some(reason) => format!("{}: {}", e, reason),
                None => e,
            });
            tracing::warn!(respondent_id = %respondent_id, error = ?reason, "OAuth sign-on declined");
            state.signon.record_denial(&respondent_id, reason).await?;
            return Ok(Redirect::to("/thank_you"));
        }
    };

    tracing::info!(respondent_id = %respondent_id, "Exchanging authorization code for token");
    let result = state
        .signon
        .handle_oauth_callback(&code, &respondent_id)
        .await?;

    Ok(Redirect::to(&format!(
        "/thanks/{}",
        urlencoding::encode(&result.user_id)
    )))
}

/// Build the `state` parameter: base64url("respondent|timestamp_hex|signature_hex").
fn sign_state(respondent_id: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", respondent_id, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature).as_bytes()))
}

/// Verify HMAC signature and age, returning the respondent ID from `state`.
fn verify_and_decode_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Split from the right so the respondent ID may itself contain '|'
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let respondent_id = parts.next()?;

    let payload = format!("{}|{}", respondent_id, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if !bool::from(expected_signature.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_ms = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_ms) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(respondent_id.to_string())
}
