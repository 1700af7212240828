// tests/video_test.rs
// Channel-scoped video search against a local HTTP stub

mod common;

use common::{Canned, MockServer, search_reply};
use museo::config::VideoSettings;
use museo::video::{VideoFinder, VideoHit, VideoQuery, VideoSearch};
use serde_json::json;

const CHANNEL: &str = "UCpAQimPOzeu_VRWRs_S4cPw";

fn finder_for(server: &MockServer) -> VideoFinder {
    let settings = VideoSettings {
        base_url: server.base_url.clone(),
        ..Default::default()
    };
    VideoFinder::new(reqwest::Client::new(), &settings, Some("yt-test".into()))
}

#[tokio::test]
async fn test_hits_keep_service_order() {
    let server = MockServer::start(vec![Canned::json(
        200,
        search_reply(&[("Inside the Giant Heart", "h1"), ("Heart Facts", "h2")]),
    )])
    .await;
    let finder = finder_for(&server);

    let hits = finder.search(&VideoQuery::new("Giant Heart", CHANNEL), 3).await;
    assert_eq!(
        hits,
        vec![
            VideoHit::new("Inside the Giant Heart", "h1"),
            VideoHit::new("Heart Facts", "h2"),
        ]
    );
}

#[tokio::test]
async fn test_query_parameters() {
    let server = MockServer::start(vec![Canned::json(200, search_reply(&[]))]).await;
    let finder = finder_for(&server);

    finder
        .search(&VideoQuery::new("Your Brain & You", CHANNEL), 3)
        .await;

    let sent = &server.requests()[0];
    assert_eq!(sent.method, "GET");
    assert!(sent.target.starts_with("/search?"));
    assert_eq!(sent.query("key").as_deref(), Some("yt-test"));
    assert_eq!(sent.query("channelId").as_deref(), Some(CHANNEL));
    assert_eq!(sent.query("part").as_deref(), Some("snippet"));
    assert_eq!(sent.query("q").as_deref(), Some("Your Brain & You"));
    assert_eq!(sent.query("maxResults").as_deref(), Some("3"));
    assert_eq!(sent.query("order").as_deref(), Some("relevance"));
    assert_eq!(sent.query("type").as_deref(), Some("video"));
}

#[tokio::test]
async fn test_zero_items_is_empty() {
    let server = MockServer::start(vec![Canned::json(200, json!({"items": []}))]).await;
    let finder = finder_for(&server);

    let hits = finder.search(&VideoQuery::new("Nothing Here", CHANNEL), 3).await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_service_error_degrades_to_empty() {
    let server = MockServer::start(vec![Canned::json(
        403,
        json!({"error": {"code": 403, "message": "quotaExceeded"}}),
    )])
    .await;
    let finder = finder_for(&server);

    let query = VideoQuery::new("Space", CHANNEL);
    assert!(finder.search(&query, 3).await.is_empty());

    // The fallible form still reports what happened
    let err = finder.try_search(&query, 3).await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_results_capped_at_max() {
    let server = MockServer::start(vec![Canned::json(
        200,
        search_reply(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]),
    )])
    .await;
    let finder = finder_for(&server);

    let hits = finder.search(&VideoQuery::new("Electricity", CHANNEL), 3).await;
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[2].video_id, "3");
}
