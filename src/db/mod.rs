// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record store layer (Firestore) and the download queue interface.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryUserStore;

use crate::error::Result;
use crate::models::UserRecord;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const DENIED_SIGNONS: &str = "denied_signons";
    pub const ARTIFACTS: &str = "artifacts";
}

/// Pending-user queue backed by the record store.
///
/// Not safe for concurrent workers: two workers reading the same queue can
/// both download the same pending user.
pub trait UserQueue: Send + Sync {
    /// All records without a completion marker, in store order.
    fn list_pending(&self) -> impl Future<Output = Result<Vec<UserRecord>>> + Send;

    /// Set the completion marker on the record with `doc_id`.
    ///
    /// Returns `false` when no such record exists.
    fn mark_complete(
        &self,
        doc_id: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send;
}
