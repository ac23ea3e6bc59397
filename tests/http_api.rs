mod common;

use std::sync::Arc;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use salesgrid::api::{self, AppState};
use salesgrid::core::config::Config;
use salesgrid::query::parser::QueryParser;
use salesgrid::reader::ChunkedSource;
use salesgrid::search::executor::QueryEngine;

use common::{engine, sample_rows, write_csv};

fn router_for(engine: QueryEngine) -> Router {
    let config = Config::default();
    api::router(AppState::new(Arc::new(engine), QueryParser::new(&config.query)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn customer_names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["Customer Name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn sales_applies_filters_sort_and_paging() {
    let app = router_for(engine(sample_rows()));
    let (status, body) = get(
        app,
        "/api/sales?customerRegion=North,Mumbai&gender=Female&sortBy=customerName&sortOrder=asc&page=1&pageSize=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer_names(&body), vec!["Customer 01", "Customer 05"]);
    assert_eq!(body["pagination"]["totalItems"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], false);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["pageSize"], 2);
}

#[tokio::test]
async fn sales_tolerates_malformed_parameters() {
    let app = router_for(engine(sample_rows()));
    let (status, body) = get(
        app,
        "/api/sales?page=abc&pageSize=lots&sortBy=price&sortOrder=sideways&ageRange=60%2B,ancient",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["pageSize"], 10);
    // ages 60, 61 and 70 in source order
    assert_eq!(customer_names(&body), vec!["Customer 05", "Customer 06", "Customer 11"]);
}

#[tokio::test]
async fn sales_clamps_page_size() {
    let app = router_for(engine(sample_rows()));
    let (_, body) = get(app, "/api/sales?pageSize=5000").await;
    assert_eq!(body["pagination"]["pageSize"], 100);
    assert_eq!(body["data"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn sales_on_empty_dataset_is_well_formed() {
    let app = router_for(engine(Vec::new()));
    let (status, body) = get(app, "/api/sales?search=anyone").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["pagination"]["totalItems"], 0);
    assert_eq!(body["pagination"]["totalPages"], 0);
    assert_eq!(body["pagination"]["hasNext"], false);
}

#[tokio::test]
async fn filters_lists_menu_values() {
    let app = router_for(engine(sample_rows()));
    let (status, body) = get(app, "/api/sales/filters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genders"], serde_json::json!(["Female", "Male"]));
    assert_eq!(body["storeLocations"], serde_json::json!(["Delhi", "Pune"]));
    assert!(body["customerRegions"].as_array().unwrap().contains(&Value::from("mumbai")));
}

#[tokio::test]
async fn summary_totals_the_page() {
    let app = router_for(engine(sample_rows()));
    let (status, body) = get(app, "/api/sales/summary?customerRegion=south&sortBy=none").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUnits"], 6);
    assert_eq!(body["totalSales"], 540.0);
}

#[tokio::test]
async fn health_reports_source_and_cache() {
    let app = router_for(engine(sample_rows()));
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["source"]["records"], 12);
    assert_eq!(body["cache"]["capacity"], 50);
}

#[tokio::test]
async fn health_is_degraded_on_empty_dataset() {
    let app = router_for(engine(Vec::new()));
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = router_for(engine(sample_rows()));
    let (status, body) = get(app, "/api/orders").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Route GET /api/orders not found");
    assert!(body["availableEndpoints"]
        .as_array()
        .unwrap()
        .contains(&Value::from("GET /api/sales")));
}

#[tokio::test]
async fn root_lists_endpoints() {
    let app = router_for(engine(Vec::new()));
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["filters"], "/api/sales/filters");
}

#[tokio::test]
async fn unreadable_stream_yields_safe_default_bodies() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir.path().join("sales_data_part1.csv"), &sample_rows());
    let engine = QueryEngine::new(
        Arc::new(ChunkedSource::from_files(vec![path.clone()])),
        &Config::default(),
    );
    std::fs::remove_file(&path).unwrap();
    let app = router_for(engine);

    let (status, body) = get(app.clone(), "/api/sales?page=2&pageSize=5").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalItems"], 0);
    assert!(body["error"].is_string());

    let (status, body) = get(app, "/api/sales/filters").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["customerRegions"], serde_json::json!([]));
    assert_eq!(body["paymentMethods"], serde_json::json!([]));
}

#[tokio::test]
async fn app_adds_security_headers() {
    let config = Config::default();
    let state = AppState::new(Arc::new(engine(sample_rows())), QueryParser::new(&config.query));
    let app = api::app(state, &config.server).unwrap();

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(resp.headers()["x-frame-options"], "DENY");
}
