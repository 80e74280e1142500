//! Tests for authentication and error response shapes
//!
//! Verifies that unauthenticated requests are rejected before any
//! handler runs and that every error response carries the expected
//! fields: `error` and a UUID `request_id` for correlation.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tarmac_api::auth::{Identity, Permission, StaticTokenVerifier, TokenVerifier};
use tarmac_api::{build_router, AppState};
use tarmac_core::{ConfigSnapshot, PlanRouter, PlanService};
use tarmac_router::{RouterCatalogService, RouterRegistry};
use tarmac_storage::{LocalSqliteBackend, SqlitePlanStore};
use tempfile::NamedTempFile;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> (NamedTempFile, Router) {
    let config = Arc::new(ConfigSnapshot::empty());

    let temp_file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(LocalSqliteBackend::new(temp_file.path()));
    let plans = Arc::new(PlanService::new(store, config.clone()));

    let built_ins = vec![PlanRouter {
        name: "fake".to_string(),
        router_type: "fake".to_string(),
        is_default: true,
    }];
    let registry = RouterRegistry::new(built_ins, config).unwrap();
    let catalog = Arc::new(RouterCatalogService::new(Arc::new(registry)));

    let mut verifier = StaticTokenVerifier::new();
    verifier.insert("reader-token", Identity::new("reader", []));
    verifier.insert(
        "app-token",
        Identity::new("creator", [Permission::AppCreate]),
    );
    let verifier: Arc<dyn TokenVerifier> = Arc::new(verifier);

    (temp_file, build_router(AppState { plans, catalog }, verifier))
}

async fn extract_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Failed to parse JSON")
}

fn assert_error_shape(json: &Value) {
    assert!(json.get("error").is_some(), "missing 'error' field: {:?}", json);
    let request_id = json["request_id"].as_str().expect("missing request_id");
    assert!(
        Uuid::parse_str(request_id).is_ok(),
        "'request_id' should be a valid UUID: {}",
        request_id
    );
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (_guard, app) = test_app();

    let req = Request::builder()
        .uri("/routers")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_error_shape(&extract_json_body(response).await);
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let (_guard, app) = test_app();

    let req = Request::builder()
        .uri("/routers")
        .header("Authorization", "Bearer no-such-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_error_shape(&extract_json_body(response).await);
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let (_guard, app) = test_app();

    let req = Request::builder()
        .uri("/routers")
        .header("Authorization", "bearer app-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let (_guard, app) = test_app();

    let req = Request::builder()
        .uri("/routers")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forbidden_response_shape() {
    let (_guard, app) = test_app();

    let req = Request::builder()
        .uri("/routers")
        .header("Authorization", "Bearer reader-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_error_shape(&extract_json_body(response).await);
}
