// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated collection download.
//!
//! Collection responses look like `{"data": [...], "paging": {"next": url}}`.
//! Pages are followed until there is no `next` link or a page comes back
//! with an empty `data` array. The empty-page rule stops pagination even
//! when a `next` link is present.

use crate::error::{AppError, Result};
use crate::models::Artifact;
use crate::services::GraphClient;
use serde_json::Value;

/// Fetch every page of the collection at `locator` and concatenate the `data` arrays.
///
/// A first response that is not JSON is returned unchanged as `Artifact::Raw`.
/// Transport and HTTP errors are returned as-is; nothing is retried.
pub async fn fetch_all(client: &GraphClient, locator: &str) -> Result<Artifact> {
    let body = client.get_raw(locator).await?;

    let mut page: Value = match serde_json::from_slice(&body) {
        Ok(page) => page,
        Err(_) => {
            tracing::info!(bytes = body.len(), "Edge wasn't JSON, storing raw content");
            return Ok(Artifact::Raw(body));
        }
    };

    let mut all_items = take_data(&mut page);
    let mut last_page_len = all_items.len();
    let mut pages = 1usize;

    while last_page_len > 0 {
        let Some(next) = next_link(&page) else {
            break;
        };

        let body = client.get_raw(&next).await?;
        page = serde_json::from_slice(&body).map_err(|e| {
            AppError::GraphApi(format!("Malformed page {} of collection: {}", pages + 1, e))
        })?;

        let items = take_data(&mut page);
        last_page_len = items.len();
        all_items.extend(items);
        pages += 1;
    }

    tracing::debug!(pages, items = all_items.len(), "Collection downloaded");

    Ok(Artifact::Json(Value::Array(all_items)))
}

/// Move the page's `data` array out; anything else counts as empty.
fn take_data(page: &mut Value) -> Vec<Value> {
    match page.get_mut("data").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn next_link(page: &Value) -> Option<String> {
    page.get("paging")
        .and_then(|paging| paging.get("next"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
