#![cfg(feature = "server")]

use agentflow::api::{router, AppState};
use agentflow::{pricing, AppConfig, Language};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(temp_dir: &TempDir) -> Router {
    let mut config = AppConfig::default();
    config.reports.output_dir = temp_dir.path().to_str().unwrap().to_string();
    let state = Arc::new(AppState::new(config).unwrap());
    router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn analyze(app: &Router) -> serde_json::Value {
    let request = pricing::template("retail").unwrap().to_request(Language::Es);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&request).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "agentflow");
}

#[tokio::test]
async fn test_status_reports_simulation_mode() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let response = get(&app, "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["mode"], "simulation");
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_templates_and_estimates() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let response = get(&app, "/api/templates").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let templates = body["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 3);
    assert_eq!(templates[0]["name"], "Home Value Store");

    let response = get(&app, "/api/estimate?analysis_type=market").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["analysis_type"], "market");
    assert_eq!(body["estimate"]["cost_min"], 0.10);
    assert_eq!(body["estimate"]["pages_max"], 12);

    // Missing the query parameter is a client error
    let response = get(&app, "/api/estimate").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_then_fetch_report() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let body = analyze(&app).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["mode"], "simulation");
    let report_file = body["report_file"].as_str().unwrap().to_string();
    assert!(report_file.ends_with(".pdf"));

    let response = get(&app, "/api/reports").await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["reports"].as_array().unwrap().len(), 1);
    assert_eq!(listing["stats"]["count"], 1);

    let response = get(&app, &format!("/api/reports/{}", report_file)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));

    let response = get(&app, "/api/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let metrics = body_json(response).await;
    assert_eq!(metrics["analyses_total"], 1);
    assert_eq!(metrics["success_rate"], 100.0);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let body = analyze(&app).await;
    let report_file = body["report_file"].as_str().unwrap().to_string();

    let unconfirmed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/reports/{}", report_file))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unconfirmed.status(), StatusCode::BAD_REQUEST);

    let confirmed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/reports/{}?confirm=true", report_file))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status(), StatusCode::OK);

    let gone = get(&app, &format!("/api/reports/{}", report_file)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_reports_with_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    analyze(&app).await;
    analyze(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/reports?confirm=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["deleted_count"], 2);
}

#[tokio::test]
async fn test_report_name_is_validated() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let response = get(&app, "/api/reports/no_existe.pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Escaping the reports directory is rejected, not treated as missing
    let response = get(&app, "/api/reports/..%2Frun_ledger.json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_blank_company() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let payload = serde_json::json!({
        "company": { "name": "  ", "industry": "Retail", "location": "Madrid" },
        "analysis_type": "market"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
