// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Download queue tests for the in-memory and Firestore record stores.

use chrono::TimeZone;
use graph_harvester::db::{MemoryUserStore, UserQueue};
use graph_harvester::models::GraphUser;

mod common;
use common::{pending_user, test_db};

fn fixed_time() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap()
}

#[tokio::test]
async fn test_list_pending_skips_downloaded() {
    let queue = MemoryUserStore::new();

    let mut done = pending_user("U1", "Ada");
    done.downloaded = Some("2026-02-01T00:00:00Z".to_string());
    queue.insert(done).await;
    let pending_a = queue.insert(pending_user("U2", "Grace")).await;
    let pending_b = queue.insert(pending_user("U3", "Linus")).await;

    let pending: Vec<_> = queue
        .list_pending()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|r| r.doc_id)
        .collect();

    assert_eq!(pending, vec![pending_a, pending_b]);
}

#[tokio::test]
async fn test_mark_complete_sets_marker() {
    let queue = MemoryUserStore::new();
    let doc_id = queue.insert(pending_user("U1", "Ada")).await;

    assert!(queue.mark_complete(&doc_id, fixed_time()).await.unwrap());

    let record = queue.get(&doc_id).await.unwrap();
    assert_eq!(record.downloaded.as_deref(), Some("2026-03-01T12:30:00Z"));
    assert!(queue.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_complete_twice_is_idempotent() {
    let queue = MemoryUserStore::new();
    let doc_id = queue.insert(pending_user("U1", "Ada")).await;

    assert!(queue.mark_complete(&doc_id, fixed_time()).await.unwrap());
    let once = queue.all().await;
    assert!(queue.mark_complete(&doc_id, fixed_time()).await.unwrap());

    assert_eq!(queue.all().await, once);
}

#[tokio::test]
async fn test_mark_complete_unknown_id() {
    let queue = MemoryUserStore::new();
    queue.insert(pending_user("U1", "Ada")).await;

    assert!(!queue.mark_complete("no-such-doc", fixed_time()).await.unwrap());
    assert_eq!(queue.list_pending().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_offline_record_store_is_fatal() {
    let db = graph_harvester::db::FirestoreDb::new_mock();

    let err = db.list_pending().await.unwrap_err();
    assert!(err.is_fatal());

    let err = db.mark_complete("doc", fixed_time()).await.unwrap_err();
    assert!(err.is_fatal());
}

// ═══════════════════════════════════════════════════════════════════════════
// FIRESTORE (EMULATOR) TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_firestore_queue_lifecycle() {
    require_emulator!();

    let db = test_db().await;

    let first = db.insert_user(&pending_user("U1", "Ada")).await.unwrap();
    let second = db.insert_user(&pending_user("U2", "Grace")).await.unwrap();

    let mut pending: Vec<_> = db
        .list_pending()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|r| r.doc_id)
        .collect();
    pending.sort();
    let mut expected = vec![first.clone(), second.clone()];
    expected.sort();
    assert_eq!(pending, expected);

    assert!(db.mark_complete(&first, fixed_time()).await.unwrap());

    let pending = db.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].doc_id.as_deref(), Some(second.as_str()));

    // Other fields survive the completion write
    let stored = db.get_user(&first).await.unwrap().unwrap();
    assert_eq!(stored.downloaded.as_deref(), Some("2026-03-01T12:30:00Z"));
    assert_eq!(
        stored.user,
        Some(GraphUser {
            id: "U1".to_string(),
            name: "Ada".to_string()
        })
    );
    assert_eq!(stored.respondent_id, "resp-U1");

    assert!(!db.mark_complete("no-such-doc", fixed_time()).await.unwrap());
}

#[tokio::test]
async fn test_firestore_find_user_by_graph_id() {
    require_emulator!();

    let db = test_db().await;

    let mut older = pending_user("U9", "Old Name");
    older.created_at = "2026-01-01T00:00:00Z".to_string();
    let mut newer = pending_user("U9", "New Name");
    newer.created_at = "2026-02-01T00:00:00Z".to_string();
    db.insert_user(&older).await.unwrap();
    db.insert_user(&newer).await.unwrap();

    let found = db.find_user_by_graph_id("U9").await.unwrap().unwrap();
    assert_eq!(found.user.unwrap().name, "New Name");

    assert!(db.find_user_by_graph_id("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_firestore_mark_complete_keeps_other_fields() {
    require_emulator!();

    let db = test_db().await;
    let collection = db.users_collection().to_string();

    // Record written by another system, with a field this crate does not model
    let mut doc = serde_json::to_value(pending_user("U1", "Ada")).unwrap();
    doc["survey_wave"] = serde_json::json!(3);
    db.set_document(&collection, "shared-1", &doc).await.unwrap();

    assert!(db.mark_complete("shared-1", fixed_time()).await.unwrap());

    let stored: serde_json::Value = db
        .get_document(&collection, "shared-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["survey_wave"], 3);
    assert_eq!(stored["downloaded"], "2026-03-01T12:30:00Z");
    assert_eq!(stored["user"]["name"], "Ada");
    assert_eq!(stored["token"]["access_token"], "token-U1");
}

#[tokio::test]
async fn test_firestore_unreadable_record_skipped() {
    require_emulator!();

    let db = test_db().await;
    let collection = db.users_collection().to_string();

    db.set_document(&collection, "junk", &serde_json::json!({"respondent_id": 42}))
        .await
        .unwrap();
    let good = db.insert_user(&pending_user("U2", "Grace")).await.unwrap();

    let pending = db.list_pending().await.unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].doc_id.as_deref(), Some(good.as_str()));
}
