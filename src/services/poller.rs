// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Poll loop driving the download queue.
//!
//! Two states:
//! - `Draining`: work through an in-memory snapshot of pending users, one at
//!   a time. The snapshot is not refreshed until it is empty, so users who
//!   sign on mid-drain wait for the next snapshot.
//! - `Idle`: sleep, then take a new snapshot.
//!
//! A failed download leaves the user pending for a later pass. Record store
//! and data store failures end the loop.

use crate::db::UserQueue;
use crate::error::Result;
use crate::models::UserRecord;
use crate::services::downloader::UserDownloader;
use crate::store::DataStore;
use chrono::Utc;
use std::collections::VecDeque;
use std::time::Duration;

/// Default wait between polls of an empty queue.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_secs(300);

/// Poll loop state.
#[derive(Debug)]
pub enum PollState {
    /// Users left in the current snapshot
    Draining(VecDeque<UserRecord>),
    /// Queue was empty at the last look
    Idle,
}

impl PollState {
    fn from_snapshot(snapshot: Vec<UserRecord>) -> Self {
        if snapshot.is_empty() {
            PollState::Idle
        } else {
            PollState::Draining(snapshot.into())
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PollState::Idle)
    }
}

/// What happened to one user during a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    /// Downloaded and marked complete
    Completed,
    /// Download failed; still pending
    Failed,
}

/// Sequential download worker.
pub struct PollLoop<Q, S> {
    queue: Q,
    downloader: UserDownloader<S>,
    idle_sleep: Duration,
}

impl<Q: UserQueue, S: DataStore> PollLoop<Q, S> {
    pub fn new(queue: Q, downloader: UserDownloader<S>, idle_sleep: Duration) -> Self {
        Self {
            queue,
            downloader,
            idle_sleep,
        }
    }

    /// Run forever. Only returns on a record store or data store error.
    pub async fn run(&self) -> Result<()> {
        let mut state = self.start().await?;
        loop {
            state = self.step(state).await?;
        }
    }

    /// Take the initial snapshot of the pending queue.
    pub async fn start(&self) -> Result<PollState> {
        let snapshot = self.queue.list_pending().await?;
        tracing::info!(pending = snapshot.len(), "Initial queue snapshot");
        Ok(PollState::from_snapshot(snapshot))
    }

    /// Advance the state machine by one user (draining) or one poll (idle).
    pub async fn step(&self, state: PollState) -> Result<PollState> {
        match state {
            PollState::Draining(mut queue) => {
                if let Some(record) = queue.pop_front() {
                    self.process_user(&record).await?;
                }
                if queue.is_empty() {
                    Ok(PollState::Idle)
                } else {
                    Ok(PollState::Draining(queue))
                }
            }
            PollState::Idle => {
                tracing::info!(
                    seconds = self.idle_sleep.as_secs(),
                    "Sleeping before re-checking if there's work to do"
                );
                tokio::time::sleep(self.idle_sleep).await;

                let snapshot = self.queue.list_pending().await?;
                if !snapshot.is_empty() {
                    tracing::info!(pending = snapshot.len(), "New users to download");
                }
                Ok(PollState::from_snapshot(snapshot))
            }
        }
    }

    /// Download one user and mark them complete on success.
    pub async fn process_user(&self, record: &UserRecord) -> Result<UserOutcome> {
        let Some(doc_id) = record.doc_id.as_deref() else {
            tracing::error!(
                respondent_id = %record.respondent_id,
                "Queued record has no identifier, skipping"
            );
            return Ok(UserOutcome::Failed);
        };

        let name = record.user.as_ref().map(|u| u.name.as_str()).unwrap_or("");
        let user_id = record.graph_user_id().unwrap_or("");
        tracing::info!(doc_id, user_id, name, "Downloading data for user");

        match self.downloader.download(record).await {
            Ok(true) => {
                tracing::info!(doc_id, user_id, "Data stored successfully");
                if self.queue.mark_complete(doc_id, Utc::now()).await? {
                    tracing::info!(doc_id, user_id, "User marked as downloaded");
                } else {
                    tracing::warn!(doc_id, user_id, "User record vanished before it could be marked");
                }
                Ok(UserOutcome::Completed)
            }
            Ok(false) => {
                tracing::warn!(doc_id, user_id, "Download did not complete, user stays pending");
                Ok(UserOutcome::Failed)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                if e.is_graph_token_error() {
                    tracing::warn!(
                        doc_id,
                        user_id,
                        "Access token rejected; user will be retried every pass until it is replaced"
                    );
                }
                tracing::error!(doc_id, user_id, error = %e, "Download failed, user stays pending");
                Ok(UserOutcome::Failed)
            }
        }
    }
}
