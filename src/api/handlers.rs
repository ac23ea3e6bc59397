use std::collections::HashMap;
use std::sync::Arc;
use axum::extract::{Query as QueryParams, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use crate::core::error::{Error, ErrorKind};
use crate::core::stats::HealthStatus;
use crate::query::ast::Query;
use crate::query::parser::QueryParser;
use crate::search::executor::QueryEngine;
use crate::search::facets::FilterOptions;
use crate::search::results::{Pagination, ResultPage};
use crate::search::summary::PageSummary;

pub const ENDPOINTS: [&str; 5] = [
    "GET /",
    "GET /health",
    "GET /api/sales",
    "GET /api/sales/filters",
    "GET /api/sales/summary",
];

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
    pub parser: Arc<QueryParser>,
}

impl AppState {
    pub fn new(engine: Arc<QueryEngine>, parser: QueryParser) -> Self {
        AppState { engine, parser: Arc::new(parser) }
    }
}

/// Error body that still carries a well-formed payload
#[derive(Serialize)]
struct Failed<T: Serialize> {
    #[serde(flatten)]
    body: T,
    error: String,
}

fn failed<T: Serialize>(body: T, err: Error) -> Response {
    tracing::error!(error = %err, "request failed");
    let failed = Failed { body, error: err.context };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(failed)).into_response()
}

/// Run engine work off the async runtime.
async fn blocking<T, F>(engine: &Arc<QueryEngine>, work: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce(&QueryEngine) -> Result<T, Error> + Send + 'static,
{
    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || work(&engine))
        .await
        .map_err(|e| Error::new(ErrorKind::Internal, format!("query task failed: {}", e)))?
}

pub async fn sales(
    State(st): State<AppState>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Response {
    let query = st.parser.parse_map(&params);
    let fallback = ResultPage::empty(Pagination::new(query.page, query.page_size, 0));

    match blocking(&st.engine, move |engine| engine.query(&query)).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => failed(fallback, err),
    }
}

pub async fn filters(State(st): State<AppState>) -> Response {
    match blocking(&st.engine, |engine| engine.filter_options()).await {
        Ok(options) => Json(options).into_response(),
        Err(err) => failed(FilterOptions::default(), err),
    }
}

pub async fn summary(
    State(st): State<AppState>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Response {
    let query: Query = st.parser.parse_map(&params);
    match blocking(&st.engine, move |engine| engine.summary(&query)).await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => failed(PageSummary::default(), err),
    }
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "Retail sales query API",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": {
            "health": "/health",
            "sales": "/api/sales",
            "filters": "/api/sales/filters",
            "summary": "/api/sales/summary",
        },
    }))
}

pub async fn health(State(st): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let stats = st.engine.stats();
    let health = stats.health();
    let (status, message) = match &health {
        HealthStatus::Healthy => ("healthy", None),
        HealthStatus::Degraded(reason) => ("degraded", Some(reason.clone())),
        HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason.clone())),
    };
    let code = if matches!(health, HealthStatus::Unhealthy(_)) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = json!({
        "status": status,
        "message": message,
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": stats.uptime_secs,
        "source": {
            "mode": stats.source_mode,
            "files": stats.source_files,
            "records": stats.total_records,
        },
        "queriesServed": stats.queries_served,
        "cache": {
            "hits": stats.cache_stats.hit_count,
            "misses": stats.cache_stats.miss_count,
            "size": stats.cache_stats.size,
            "capacity": stats.cache_stats.capacity,
            "hitRate": stats.cache_stats.hit_rate(),
        },
        "filterOptionsCached": stats.filter_options_cached,
    });
    (code, Json(body))
}

pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!(%method, path = uri.path(), "route not found");
    let body = json!({
        "status": 404,
        "error": "Not Found",
        "message": format!("Route {} {} not found", method, uri.path()),
        "timestamp": Utc::now().to_rfc3339(),
        "availableEndpoints": ENDPOINTS,
    });
    (StatusCode::NOT_FOUND, Json(body))
}
