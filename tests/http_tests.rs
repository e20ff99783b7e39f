//! End-to-end HTTP tests over the Axum router.

#![cfg(feature = "axum-integration")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use page2pdf_api::integrations::axum::router;
use page2pdf_api::prelude::*;
use page2pdf_api::session::mock::{MockBehavior, MockSessionFactory};
use std::time::Duration;
use tower::ServiceExt;

fn app(behavior: MockBehavior) -> axum::Router {
    let backend: SharedBackend = Arc::new(BrowserBackend::new(
        MockSessionFactory::with_behavior(behavior),
        BrowserSettings {
            settle_delay: Duration::ZERO,
            ..BrowserSettings::default()
        },
    ));
    router(AppState::new(backend, Duration::from_secs(5)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_pdf_download() {
    let response = app(MockBehavior::default())
        .oneshot(get("/pdf?url=https%3A%2F%2Fdocs.example.com%2Fguide"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(!body.is_empty());
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_blank_url_is_bad_request() {
    let response = app(MockBehavior::default())
        .oneshot(get("/pdf?url=%20%20"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Please provide a URL");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_invalid_url_is_server_error() {
    let response = app(MockBehavior::default())
        .oneshot(get("/pdf?url=not-a-url"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Failed to generate PDF");
    assert!(json["details"].as_str().unwrap().contains("Invalid URL"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(MockBehavior::default())
        .oneshot(get("/pool/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_repeated_url_parameter_converts_first() {
    let response = app(MockBehavior::default())
        .oneshot(get("/pdf?url=https://a.example.com&url=https://b.example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    for uri in ["/pdf?url=%ZZ&url=%ZZ", "/pdf?url=%E0%A4%A&=x", "/pdf?&&=&url"] {
        let response = app(MockBehavior::default()).oneshot(get(uri)).await.unwrap();

        let status = response.status();
        assert!(
            status == StatusCode::BAD_REQUEST || status == StatusCode::INTERNAL_SERVER_ERROR,
            "{}: {}",
            uri,
            status
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string(), "{}: {}", uri, json);
    }
}
