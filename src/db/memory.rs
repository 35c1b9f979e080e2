// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory user queue, used by tests and local dry runs.

use crate::db::UserQueue;
use crate::error::Result;
use crate::models::UserRecord;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Ordered list of user records held in memory.
///
/// Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    records: Arc<Mutex<Vec<UserRecord>>>,
    pending_queries: Arc<AtomicU64>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, assigning a document ID if it has none.
    pub async fn insert(&self, mut record: UserRecord) -> String {
        let mut records = self.records.lock().await;
        let doc_id = record
            .doc_id
            .clone()
            .unwrap_or_else(|| format!("doc-{}", records.len() + 1));
        record.doc_id = Some(doc_id.clone());
        records.push(record);
        doc_id
    }

    /// Look up a record by document ID.
    pub async fn get(&self, doc_id: &str) -> Option<UserRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.doc_id.as_deref() == Some(doc_id))
            .cloned()
    }

    /// Copy of every record, pending or not.
    pub async fn all(&self) -> Vec<UserRecord> {
        self.records.lock().await.clone()
    }

    /// How many times `list_pending` has been called.
    pub fn pending_queries(&self) -> u64 {
        self.pending_queries.load(Ordering::Relaxed)
    }
}

impl UserQueue for MemoryUserStore {
    async fn list_pending(&self) -> Result<Vec<UserRecord>> {
        self.pending_queries.fetch_add(1, Ordering::Relaxed);

        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.is_pending())
            .cloned()
            .collect())
    }

    async fn mark_complete(&self, doc_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut records = self.records.lock().await;

        match records
            .iter_mut()
            .find(|r| r.doc_id.as_deref() == Some(doc_id))
        {
            Some(record) => {
                record.downloaded = Some(format_utc_rfc3339(at));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
