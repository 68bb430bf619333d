//! API integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use vod_api::{create_router, ApiConfig, AppState};
use vod_registry::MemoryLinkStore;
use vod_storage::{S3Client, S3Config};

async fn create_test_router() -> Router {
    let storage = S3Client::new(S3Config {
        region: "ap-south-1".to_string(),
        access_key_id: Some("test-access-key".to_string()),
        secret_access_key: Some("test-secret-key".to_string()),
    })
    .await
    .unwrap();

    let config = ApiConfig {
        upload_bucket: "test-upload-bucket".to_string(),
        ..ApiConfig::default()
    };

    let state = AppState::new(config, Arc::new(storage), Arc::new(MemoryLinkStore::new()));
    create_router(state, None)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_presigned_upload_url_issued() {
    let app = create_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/upload/getPresignedUrl")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let key = json["key"].as_str().unwrap();
    let video_id = json["videoId"].as_str().unwrap();
    assert!(key.starts_with("uploads/video-"));
    assert!(key.ends_with(".mp4"));

    // The id is the key's filename minus its extension
    let expected_id = key
        .rsplit('/')
        .next()
        .unwrap()
        .strip_suffix(".mp4")
        .unwrap();
    assert_eq!(video_id, expected_id);

    let url = json["presignedUrl"].as_str().unwrap();
    assert!(url.contains("test-upload-bucket"));
    assert!(url.contains("X-Amz-Signature"));
}

#[tokio::test]
async fn test_download_url_requires_key() {
    let app = create_test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/upload/getDownloadUrl",
            serde_json::json!({"key": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_url_issued() {
    let app = create_test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/upload/getDownloadUrl",
            serde_json::json!({"key": "uploads/video-abc123.mp4"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let url = json["accessUrl"].as_str().unwrap();
    assert!(url.contains("uploads/video-abc123.mp4"));
}

/// Polling before the worker has reported the link yields the exact
/// not-ready message the front-end keys off.
#[tokio::test]
async fn test_poll_before_link_exists() {
    let app = create_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/upload/video-link/video-abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Video not generated yet");
}

/// Create-then-poll round trip: the stored playback URL comes back.
#[tokio::test]
async fn test_poll_after_link_created() {
    let app = create_test_router().await;

    let playback = "https://cdn.example.com/video-abc123/master.m3u8";
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/upload/upload-video-link",
            serde_json::json!({"videoId": "video-abc123", "videoLink": playback}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/upload/video-link/video-abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["link"]["videoId"], "video-abc123");
    assert_eq!(json["link"]["videoLink"], playback);
}

#[tokio::test]
async fn test_duplicate_link_conflicts() {
    let app = create_test_router().await;

    let body = serde_json::json!({
        "videoId": "video-abc123",
        "videoLink": "https://cdn.example.com/video-abc123/master.m3u8"
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/upload/upload-video-link", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/api/v1/upload/upload-video-link", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_link_creation_requires_both_fields() {
    let app = create_test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/upload/upload-video-link",
            serde_json::json!({"videoId": "video-abc123", "videoLink": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
