//! Integration tests for mcr-report HTTP endpoints
//!
//! Tests cover:
//! - GET /generatePDF: PDF download, empty-result notice, upstream failure
//! - GET /api/missing-contacts: JSON listing and error mapping
//! - GET /health

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use helpers::{client, FakeSource};
use mcr_common::config::TomlConfig;
use mcr_common::{CustomField, Record};
use mcr_report::{build_router, AppState, ReportSettings};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create app around a fake source with default settings
fn setup_app(source: FakeSource) -> axum::Router {
    setup_app_with_config(source, &TomlConfig::default())
}

fn setup_app_with_config(source: FakeSource, config: &TomlConfig) -> axum::Router {
    let settings = ReportSettings::new("1211037518855167", config);
    build_router(AppState::new(Arc::new(source), settings))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

fn header_str<'a>(response: &'a axum::response::Response, name: header::HeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// =============================================================================
// GET /generatePDF
// =============================================================================

#[tokio::test]
async fn test_generate_pdf_returns_attachment() {
    let alice = Record::new(
        "Alice",
        vec![
            CustomField::new("HOH Email", Some("")),
            CustomField::new("Phone Number", Some("555-1234")),
        ],
    );
    let app = setup_app(FakeSource::new().with_records("m1", vec![alice]));

    let response = app.oneshot(get("/generatePDF")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "application/pdf");
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=missing_clients.pdf"
    );

    let body = body_bytes(response.into_body()).await;
    assert!(body.starts_with(b"%PDF-"), "Body should be a PDF document");
}

#[tokio::test]
async fn test_generate_pdf_uses_configured_filename() {
    let mut config = TomlConfig::default();
    config.report.filename = "MissingClients.pdf".to_string();
    let app = setup_app_with_config(
        FakeSource::new().with_records("m1", vec![client("Bob", Some("B"), "", "")]),
        &config,
    );

    let response = app.oneshot(get("/generatePDF")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=MissingClients.pdf"
    );
}

#[tokio::test]
async fn test_no_results_is_plain_text() {
    let app = setup_app(FakeSource::new().with_records(
        "m1",
        vec![client("Complete", Some("A"), "c@example.com", "555-0000")],
    ));

    let response = app.oneshot(get("/generatePDF")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_str(&response, header::CONTENT_TYPE).starts_with("text/plain"));

    let body = body_bytes(response.into_body()).await;
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "No clients missing phone or email found."
    );
}

#[tokio::test]
async fn test_no_containers_is_plain_text() {
    let app = setup_app(FakeSource::new());

    let response = app.oneshot(get("/generatePDF")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response.into_body()).await;
    assert_eq!(
        String::from_utf8(body).unwrap(),
        mcr_report::api::NO_RESULTS_MESSAGE
    );
}

#[tokio::test]
async fn test_upstream_failure_is_500_without_pdf() {
    let app = setup_app(
        FakeSource::new()
            .with_records("m1", vec![client("Alice", Some("A"), "", "555")])
            .with_failure("m2", "Not Authorized"),
    );

    let response = app.oneshot(get("/generatePDF")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(header_str(&response, header::CONTENT_TYPE).starts_with("text/plain"));
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());

    let body = String::from_utf8(body_bytes(response.into_body()).await).unwrap();
    assert!(!body.starts_with("%PDF"));
    assert_eq!(body, "Error fetching clients: API error 500: Not Authorized");
}

#[tokio::test]
async fn test_timeout_is_500() {
    let mut config = TomlConfig::default();
    config.aggregation.timeout_secs = 1;
    let app = setup_app_with_config(
        FakeSource::new()
            .with_records("m1", vec![client("Alice", Some("A"), "", "555")])
            .with_delay(Duration::from_secs(10)),
        &config,
    );

    let response = app.oneshot(get("/generatePDF")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_bytes(response.into_body()).await).unwrap();
    assert_eq!(body, "Error fetching clients: timed out after 1s");
}

// =============================================================================
// GET /api/missing-contacts
// =============================================================================

#[tokio::test]
async fn test_missing_contacts_json_sorted() {
    let app = setup_app(FakeSource::new().with_records(
        "m1",
        vec![
            client("Carol", Some("C"), "", "1"),
            client("Ann", Some("A"), "a@example.com", ""),
            client("Nobody", None, "", ""),
        ],
    ));

    let response = app.oneshot(get("/api/missing-contacts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["records"][0]["name"], "Ann");
    assert_eq!(body["records"][0]["missing"], "Phone");
    assert_eq!(body["records"][1]["name"], "Carol");
    assert_eq!(body["records"][2]["segmentation"], "Unknown");
    assert_eq!(body["records"][2]["missing"], "Phone Email");
}

#[tokio::test]
async fn test_missing_contacts_upstream_error_json() {
    let app = setup_app(FakeSource::new().with_failure("m1", "boom"));

    let response = app.oneshot(get("/api/missing-contacts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("boom"));
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(FakeSource::new().with_failure("m1", "never called"));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mcr-report");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = setup_app(FakeSource::new());

    let response = app.oneshot(get("/generatepdf")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
