//! Router tests against an in-memory catalog
//!
//! Covers browsing, catalog status, the signed refresh trigger and the
//! embedded placeholder cover.

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bks_common::api::auth::now_millis;
use bks_common::api::sign_request;
use bks_common::db::NewBook;
use bks_web::db::books::insert_books;
use bks_web::services::{fallback_books, CatalogRefreshService, CatalogSource};
use bks_web::{build_router, AppState, CatalogConfig};
use helpers::{memory_pool, works, GatedSource, StaticSource};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::util::ServiceExt;

const SECRET: i64 = 424242;

fn setup_app(db: SqlitePool, source: Arc<dyn CatalogSource>, shared_secret: i64) -> axum::Router {
    let config = CatalogConfig {
        refresh_interval_minutes: 30,
        books_count: 6,
    };
    let refresh = Arc::new(CatalogRefreshService::new(db.clone(), source, config));
    build_router(AppState::new(db, refresh, shared_secret))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn numbered_books(n: usize) -> Vec<NewBook> {
    (0..n)
        .map(|i| NewBook {
            title: format!("Book {}", i),
            author: "Author".to_string(),
            description: "Desc.".to_string(),
            price: 10.0,
            isbn: format!("978{:010}", i),
            cover_image: "/static/images/book-placeholder.svg".to_string(),
            stock: 5,
        })
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "bks-web");
    assert!(body["version"].is_string());
    assert!(body.get("last_error").is_none());
}

// =============================================================================
// Browsing
// =============================================================================

#[tokio::test]
async fn test_list_books_empty_catalog() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app.oneshot(test_request("GET", "/api/books")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_books"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 12);
    assert_eq!(body["books"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_books_pagination() {
    let db = memory_pool().await;
    insert_books(&db, &numbered_books(15)).await.unwrap();
    let app = setup_app(db, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/books?page=2"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_books"], 15);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["books"].as_array().unwrap().len(), 3);
    assert_eq!(body["books"][0]["title"], "Book 12");

    // Out-of-range pages clamp to the last page
    let response = app
        .oneshot(test_request("GET", "/api/books?page=99"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_get_book_by_guid() {
    let db = memory_pool().await;
    insert_books(&db, &fallback_books()).await.unwrap();
    let app = setup_app(db, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/books"))
        .await
        .unwrap();
    let list = extract_json(response.into_body()).await;
    let guid = list["books"][1]["guid"].as_str().unwrap().to_string();

    let response = app
        .oneshot(test_request("GET", &format!("/api/books/{}", guid)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let book = extract_json(response.into_body()).await;
    assert_eq!(book["title"], "To Kill a Mockingbird");
    assert_eq!(book["isbn"], "9780061120084");
    assert_eq!(book["stock"], 20);
}

#[tokio::test]
async fn test_get_unknown_book_is_404() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app
        .oneshot(test_request("GET", "/api/books/not-a-guid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Catalog status and refresh
// =============================================================================

#[tokio::test]
async fn test_catalog_status_before_any_refresh() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app
        .oneshot(test_request("GET", "/api/catalog/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["refresh_in_progress"], false);
    assert_eq!(body["refresh_interval_minutes"], 30);
    assert_eq!(body["books_count"], 6);
    assert!(body["last_refresh"].is_null());
    assert!(body["last_report"].is_null());
}

#[tokio::test]
async fn test_refresh_with_auth_disabled_is_accepted() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), 0);

    let response = app
        .oneshot(json_request("/api/catalog/refresh", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "started");
}

#[tokio::test]
async fn test_refresh_conflict_while_running() {
    let source = Arc::new(GatedSource::new(works(3)));
    let app = setup_app(memory_pool().await, source.clone(), 0);

    let first = app
        .clone()
        .oneshot(json_request("/api/catalog/refresh", &json!({})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = app
        .clone()
        .oneshot(json_request("/api/catalog/refresh", &json!({})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let status = app
        .oneshot(test_request("GET", "/api/catalog/status"))
        .await
        .unwrap();
    let body = extract_json(status.into_body()).await;
    assert_eq!(body["refresh_in_progress"], true);

    source.release();
}

#[tokio::test]
async fn test_refresh_with_valid_signature_is_accepted() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), SECRET);

    let body = sign_request(Map::new(), SECRET, now_millis());
    let response = app
        .oneshot(json_request("/api/catalog/refresh", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_refresh_with_wrong_hash_is_401() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), SECRET);

    let mut body = sign_request(Map::new(), SECRET, now_millis());
    body["hash"] = json!("0".repeat(64));

    let response = app
        .oneshot(json_request("/api/catalog/refresh", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_wrong_secret_is_401() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), SECRET);

    let body = sign_request(Map::new(), SECRET + 1, now_millis());
    let response = app
        .oneshot(json_request("/api/catalog/refresh", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_stale_timestamp_is_401() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), SECRET);

    let body = sign_request(Map::new(), SECRET, now_millis() - 60_000);
    let response = app
        .oneshot(json_request("/api/catalog/refresh", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_extreme_timestamps_is_401() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), SECRET);

    for timestamp in [i64::MIN, i64::MAX] {
        let body = json!({ "timestamp": timestamp, "hash": "0".repeat(64) });
        let response = app
            .clone()
            .oneshot(json_request("/api/catalog/refresh", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "timestamp {}", timestamp);
    }
}

#[tokio::test]
async fn test_refresh_without_auth_fields_is_400() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(works(8))), SECRET);

    let response = app
        .oneshot(json_request("/api/catalog/refresh", &json!({ "timestamp": now_millis() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_browsing_needs_no_signature() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app.oneshot(test_request("GET", "/api/books")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Static assets
// =============================================================================

#[tokio::test]
async fn test_placeholder_cover_is_served() {
    let app = setup_app(memory_pool().await, Arc::new(StaticSource::new(vec![])), SECRET);

    let response = app
        .oneshot(test_request("GET", "/static/images/book-placeholder.svg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/svg+xml"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).starts_with("<svg"));
}
