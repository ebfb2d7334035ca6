use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use audiodeck::modules::audio::model::Language;
use audiodeck::store::memory::MemoryStore;
use audiodeck::{modules, AppState};
use bson::doc;
use serde_json::json;
use std::sync::Arc;

fn setup_test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .merge(modules::audio::routes::routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

fn connected_server() -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let server = setup_test_server(AppState::connected(store.clone()));
    (server, store)
}

#[tokio::test]
async fn test_upsert_then_get_for_every_language() {
    let (server, _store) = connected_server();

    for language in Language::ALL {
        let url = format!("/{}.mp3", language);
        let text = format!("transcript in {}", language);

        let response = server
            .post("/api/audio")
            .json(&json!({
                "language": language.as_str(),
                "audio_url": url,
                "text": text
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server.get(&format!("/api/audio/{}", language)).await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["language"], language.as_str());
        assert_eq!(body["audioUrl"], url);
        assert_eq!(body["text"], text);
        assert_eq!(body["source"], "database");
    }
}

#[tokio::test]
async fn test_repeated_upsert_updates_single_document() {
    let (server, store) = connected_server();
    let payload = json!({
        "language": "english",
        "audio_url": "/a.mp3",
        "text": "hello"
    });

    let first = server.post("/api/audio").json(&payload).await;
    first.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = first.json();
    assert_eq!(
        body,
        json!({
            "message": "Audio data for english uploaded successfully",
            "language": "english",
            "audio_url": "/a.mp3",
            "upserted": true
        })
    );

    let second = server.post("/api/audio").json(&payload).await;
    second.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = second.json();
    assert_eq!(body["upserted"], false);

    assert_eq!(store.documents().len(), 1);
}

#[tokio::test]
async fn test_upsert_replaces_url_and_text() {
    let (server, _store) = connected_server();

    server
        .post("/api/audio")
        .json(&json!({ "language": "arabic", "audio_url": "/old.mp3", "text": "old" }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/audio")
        .json(&json!({ "language": "arabic", "audio_url": "/new.mp3" }))
        .await
        .assert_status(StatusCode::CREATED);

    let body: serde_json::Value = server.get("/api/audio/arabic").await.json();
    assert_eq!(body["audioUrl"], "/new.mp3");
    assert_eq!(body["text"], "");
}

#[tokio::test]
async fn test_get_invalid_language() {
    let (server, _store) = connected_server();

    let response = server.get("/api/audio/french").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!({ "error": "Invalid language. Supported languages: english, arabic" })
    );
}

#[tokio::test]
async fn test_get_missing_record_is_not_found() {
    let (server, _store) = connected_server();

    let response = server.get("/api/audio/english").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "No audio found for language: english" }));
}

#[tokio::test]
async fn test_upsert_invalid_language_never_writes() {
    let (server, store) = connected_server();

    let response = server
        .post("/api/audio")
        .json(&json!({ "language": "french", "audio_url": "/fr.mp3" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid language. Supported languages: english, arabic");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_upsert_reports_first_missing_field() {
    let (server, store) = connected_server();

    let cases = [
        (json!({}), "language"),
        (json!({ "audio_url": "/a.mp3" }), "language"),
        (json!({ "language": "english" }), "audio_url"),
        (json!({ "language": "french" }), "audio_url"),
    ];

    for (payload, field) in cases {
        let response = server.post("/api/audio").json(&payload).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], format!("Missing required field: {}", field));
    }

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_long_transcript_round_trips() {
    let (server, _store) = connected_server();
    let text = "Zephyros ".repeat(5000);

    server
        .post("/api/audio")
        .json(&json!({ "language": "english", "audio_url": "/a.mp3", "text": text }))
        .await
        .assert_status(StatusCode::CREATED);

    let body: serde_json::Value = server.get("/api/audio/english").await.json();
    assert_eq!(body["text"], text);
}

#[tokio::test]
async fn test_empty_audio_url_is_accepted() {
    let (server, _store) = connected_server();

    server
        .post("/api/audio")
        .json(&json!({ "language": "arabic", "audio_url": "" }))
        .await
        .assert_status(StatusCode::CREATED);

    let body: serde_json::Value = server.get("/api/audio/arabic").await.json();
    assert_eq!(body["audioUrl"], "");
}

#[tokio::test]
async fn test_upsert_non_string_language_is_invalid_language() {
    let (server, store) = connected_server();

    let response = server
        .post("/api/audio")
        .json(&json!({ "language": 7, "audio_url": "/a.mp3" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid language. Supported languages: english, arabic");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_upsert_malformed_body_fails() {
    let (server, _store) = connected_server();

    let response = server.post("/api/audio").text("not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_list_strips_ids_and_counts_languages() {
    let (server, _store) = connected_server();

    for (language, url) in [("english", "/en.mp3"), ("arabic", "/ar.mp3"), ("english", "/en2.mp3")] {
        server
            .post("/api/audio")
            .json(&json!({ "language": language, "audio_url": url }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server.get("/api/audio").await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["source"], "database");

    let files = body["audio_files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    for file in files {
        assert!(file.get("_id").is_none());
        assert!(file["created_at"]["$date"].is_string());
        assert!(file["updated_at"]["$date"].is_string());
    }
    assert!(files.iter().any(|f| f["language"] == "english" && f["audio_url"] == "/en2.mp3"));
}

#[tokio::test]
async fn test_list_returns_irregular_documents_untouched() {
    let store = Arc::new(MemoryStore::with_documents(vec![
        doc! { "language": "arabic", "text": "no url yet" },
        doc! {
            "language": "english",
            "audio_url": "/en.mp3",
            "created_at": "2024-01-01T00:00:00Z",
            "speaker": "Rachel",
        },
    ]));
    let server = setup_test_server(AppState::connected(store));

    let response = server.get("/api/audio").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);

    let files = body["audio_files"].as_array().unwrap();
    let arabic = files.iter().find(|f| f["language"] == "arabic").unwrap();
    assert_eq!(arabic, &json!({ "language": "arabic", "text": "no url yet" }));

    let english = files.iter().find(|f| f["language"] == "english").unwrap();
    assert_eq!(english["created_at"], "2024-01-01T00:00:00Z");
    assert_eq!(english["speaker"], "Rachel");
    assert!(english.get("_id").is_none());
}

#[tokio::test]
async fn test_list_empty_collection() {
    let (server, _store) = connected_server();

    let response = server.get("/api/audio").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "audio_files": [], "count": 0, "source": "database" }));
}

#[tokio::test]
async fn test_disconnected_reads_degrade() {
    let server = setup_test_server(AppState::disconnected());

    let response = server.get("/api/audio/arabic").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No audio found for language: arabic");

    let response = server.get("/api/audio").await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 0);

    // language is still validated first
    server.get("/api/audio/french").await.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disconnected_upsert_is_unavailable() {
    let server = setup_test_server(AppState::disconnected());

    let response = server
        .post("/api/audio")
        .json(&json!({ "language": "english", "audio_url": "/a.mp3" }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Database connection not available");

    // checked before the body is looked at
    let response = server.post("/api/audio").json(&json!({})).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let store = Arc::new(MemoryStore::unreachable());
    let server = setup_test_server(AppState::connected(store));

    let response = server
        .post("/api/audio")
        .json(&json!({ "language": "english", "audio_url": "/a.mp3" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Internal server error:"));

    server.get("/api/audio").await.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    server.get("/api/audio/english").await.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
