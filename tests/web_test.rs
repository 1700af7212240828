// tests/web_test.rs
// HTTP API routes driven in-process with tower's oneshot

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{StubCompleter, StubSynthesizer, StubVideos};
use http_body_util::BodyExt;
use museo::Assistant;
use museo::config::MuseoConfig;
use museo::web::{AppState, AudioStore, create_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn state(completer: Arc<StubCompleter>, synthesizer: Arc<StubSynthesizer>) -> AppState {
    let assistant = Assistant::with_services(
        &MuseoConfig::default(),
        completer,
        synthesizer,
        StubVideos::new(2),
    );
    AppState::new(Arc::new(assistant), true, true)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_status() {
    let app = create_router(state(StubCompleter::ok("x"), StubSynthesizer::ok()));
    let response = app
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["completion"], true);
}

#[tokio::test]
async fn test_itinerary_plain() {
    let app = create_router(state(StubCompleter::ok("1. Giant Heart - 1 hour"), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json(
            "/api/itinerary",
            json!({"age": "8", "interests": ["Human biology"], "stay_duration": "2 hours"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["text"].as_str().unwrap().ends_with("1. Giant Heart - 1 hour"));
    assert_eq!(body["audio"]["visible"], false);
    assert!(body["audio"].get("id").is_none());
}

#[tokio::test]
async fn test_itinerary_validation_error_is_400() {
    let completer = StubCompleter::ok("unused");
    let app = create_router(state(completer.clone(), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json(
            "/api/itinerary",
            json!({"age": "ten", "interests": ["Space"], "stay_duration": "2 hours"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("age"));
    assert_eq!(completer.calls(), 0);
}

#[tokio::test]
async fn test_missing_form_field_is_400_json() {
    let completer = StubCompleter::ok("unused");
    let app = create_router(state(completer.clone(), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json("/api/itinerary", json!({"age": 10, "interests": ["Space"]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("stay_duration"));
    assert_eq!(completer.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_400_json() {
    let app = create_router(state(StubCompleter::ok("unused"), StubSynthesizer::ok()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/question")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"age\": 7, \"question\":"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_bad_narrate_flag_is_400_json() {
    let app = create_router(state(StubCompleter::ok("unused"), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json(
            "/api/itinerary?narrate=maybe",
            json!({"age": 10, "interests": ["Space"], "stay_duration": "1 hour"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_completion_failure_is_502() {
    let app = create_router(state(StubCompleter::failing("down"), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json("/api/question", json!({"age": 7, "question": "Why?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("down"));
}

#[tokio::test]
async fn test_narrated_audio_is_one_shot() {
    let state = state(StubCompleter::ok("1. Space Command - 1 hour"), StubSynthesizer::ok());
    let app = create_router(state.clone());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/itinerary?narrate=true",
            json!({"age": 10, "interests": ["Space exploration"], "stay_duration": "3 hours"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["audio"]["visible"], true);
    let id = body["audio"]["id"].as_str().unwrap().to_string();
    assert_eq!(state.audio.len().await, 1);

    let uri = format!("/api/audio/{id}");
    let response = app
        .clone()
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert!(body_bytes(response).await.starts_with(b"RIFF"));
    assert!(state.audio.is_empty().await);

    let again = app
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_speech_returns_wav_or_no_content() {
    let app = create_router(state(StubCompleter::ok("x"), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json("/api/speech", json!({"text": "Hello museum"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");

    let app = create_router(state(StubCompleter::ok("x"), StubSynthesizer::failing()));
    let response = app
        .oneshot(post_json("/api/speech", json!({"text": "Hello museum"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_exit_ticket_slots() {
    let app = create_router(state(StubCompleter::ok("Well done!"), StubSynthesizer::ok()));
    let response = app
        .oneshot(post_json(
            "/api/exit-ticket",
            json!({"age": "9", "exhibits": "Giant Heart, Your Brain", "favorite_part": "the heart"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["markup"].as_str().unwrap().starts_with("Well done!"));
    assert_eq!(body["videos"], json!(["Giant Heart1", "Your Brain1", null]));
}

#[tokio::test]
async fn test_unclaimed_narration_is_bounded() {
    let state = state(StubCompleter::ok("1. Space Command - 1 hour"), StubSynthesizer::ok())
        .with_audio_store(AudioStore::new(std::time::Duration::from_secs(600), 2));
    let app = create_router(state.clone());

    let mut ids = Vec::new();
    for _ in 0..4 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/itinerary?narrate=true",
                json!({"age": 10, "interests": ["Space"], "stay_duration": "1 hour"}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        ids.push(body["audio"]["id"].as_str().unwrap().to_string());
    }
    assert_eq!(state.audio.len().await, 2);

    let latest = format!("/api/audio/{}", ids[3]);
    let response = app
        .oneshot(Request::get(latest.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
