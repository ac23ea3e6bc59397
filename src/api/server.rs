use std::sync::Arc;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use crate::api::handlers::{self, AppState};
use crate::core::config::{Config, ServerConfig};
use crate::core::error::{Error, Result};
use crate::query::parser::QueryParser;
use crate::search::executor::QueryEngine;

/// Routes only, no middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/sales", get(handlers::sales))
        .route("/api/sales/filters", get(handlers::filters))
        .route("/api/sales/summary", get(handlers::summary))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Routes with CORS, request tracing and security headers
pub fn app(state: AppState, config: &ServerConfig) -> Result<Router> {
    Ok(router(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http()))
}

/// Any origin when the list is empty.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::invalid_config(format!("invalid CORS origin '{}'", origin)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Serve the API until ctrl-c or SIGTERM.
pub async fn serve(engine: Arc<QueryEngine>, config: &Config) -> Result<()> {
    let state = AppState::new(engine, QueryParser::new(&config.query));
    let app = app(state, &config.server)?;

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    tracing::info!(address = %config.server.addr, endpoints = ?handlers::ENDPOINTS, "sales API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
