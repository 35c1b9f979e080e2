// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated collection download tests.
//!
//! Each page lives at its own path on the mock server, and every mock
//! expects an exact request count so extra or missing fetches fail the test.

use graph_harvester::models::Artifact;
use graph_harvester::services::fetch_all;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{link, mount_page, test_graph};

#[tokio::test]
async fn test_three_pages_concatenated_in_order() {
    let server = MockServer::start().await;

    mount_page(&server, "/me/feed", json!([{"id": 1}, {"id": 2}]), Some(link(&server, "/p2"))).await;
    mount_page(&server, "/p2", json!([{"id": 3}]), Some(link(&server, "/p3"))).await;
    mount_page(&server, "/p3", json!([{"id": 4}, {"id": 5}]), None).await;

    let graph = test_graph(&server);
    let result = fetch_all(&graph, &link(&server, "/me/feed")).await.unwrap();

    assert_eq!(
        result,
        Artifact::Json(json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}, {"id": 5}]))
    );
}

#[tokio::test]
async fn test_empty_page_stops_even_with_next_link() {
    let server = MockServer::start().await;

    mount_page(&server, "/me/likes", json!([{"id": "a"}]), Some(link(&server, "/p2"))).await;
    mount_page(&server, "/p2", json!([]), Some(link(&server, "/p3"))).await;

    // Never requested
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "b"}]})))
        .expect(0)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let result = fetch_all(&graph, &link(&server, "/me/likes")).await.unwrap();

    assert_eq!(result, Artifact::Json(json!([{"id": "a"}])));
}

#[tokio::test]
async fn test_empty_first_page_with_next_link_is_one_request() {
    let server = MockServer::start().await;

    mount_page(&server, "/me/events", json!([]), Some(link(&server, "/p2"))).await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let result = fetch_all(&graph, &link(&server, "/me/events")).await.unwrap();

    assert_eq!(result, Artifact::Json(json!([])));
}

#[tokio::test]
async fn test_missing_data_counts_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/friends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": {"total_count": 120},
            "paging": {"next": link(&server, "/p2")}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let result = fetch_all(&graph, &link(&server, "/me/friends")).await.unwrap();

    assert_eq!(result, Artifact::Json(json!([])));
}

#[tokio::test]
async fn test_non_json_first_response_returned_raw() {
    let server = MockServer::start().await;
    let jpeg = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

    Mock::given(method("GET"))
        .and(path("/me/photo"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let result = fetch_all(&graph, &link(&server, "/me/photo")).await.unwrap();

    assert_eq!(result, Artifact::Raw(jpeg));
}

#[tokio::test]
async fn test_http_error_on_later_page_fails_whole_fetch() {
    let server = MockServer::start().await;

    mount_page(&server, "/me/feed", json!([{"id": 1}]), Some(link(&server, "/p2"))).await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let err = fetch_all(&graph, &link(&server, "/me/feed")).await.unwrap_err();

    assert!(err.to_string().contains("500"), "unexpected error: {}", err);
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_expired_token_error_recognized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Error validating access token: Session has expired",
                "type": "OAuthException",
                "code": 190
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let err = fetch_all(&graph, &link(&server, "/me/feed")).await.unwrap_err();

    assert!(err.is_graph_token_error());
}

#[tokio::test]
async fn test_non_json_later_page_is_an_error() {
    let server = MockServer::start().await;

    mount_page(&server, "/me/feed", json!([{"id": 1}]), Some(link(&server, "/p2"))).await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let graph = test_graph(&server);
    let err = fetch_all(&graph, &link(&server, "/me/feed")).await.unwrap_err();

    assert!(err.to_string().contains("Malformed page 2"), "unexpected error: {}", err);
}
