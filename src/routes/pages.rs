// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plain-text landing pages shown after sign-on.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::AppState;

const PRIVACY_NOTICE: &str = "\
We store the profile information and connected data you allow this app to read, \
together with your access token, for research purposes only. \
Data is never shared with third parties. \
You can revoke access at any time from your account's app settings.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/thanks/{user_id}", get(thanks))
        .route("/thank_you", get(thanks_for_nothing))
        .route("/privacy", get(privacy))
}

async fn thanks(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<String> {
    let name = state.signon.display_name(&user_id).await?;
    Ok(format!(
        "Thank you, {}! Your data will be downloaded shortly.",
        name
    ))
}

async fn thanks_for_nothing() -> &'static str {
    "Thank you for your time. No data was collected."
}

async fn privacy() -> &'static str {
    PRIVACY_NOTICE
}
