// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process artifact store.

use crate::error::Result;
use crate::models::Artifact;
use crate::store::DataStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Artifact>,
    /// Keys in write order, repeated on overwrite
    writes: Vec<String>,
}

/// Keeps artifacts in memory. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Artifact> {
        self.inner.lock().await.objects.get(key).cloned()
    }

    /// Every key written so far, in write order.
    pub async fn writes(&self) -> Vec<String> {
        self.inner.lock().await.writes.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl DataStore for MemoryStore {
    async fn store_object(&self, key: &str, artifact: &Artifact) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.objects.insert(key.to_string(), artifact.clone());
        inner.writes.push(key.to_string());
        Ok(())
    }
}
