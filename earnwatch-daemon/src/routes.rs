//! HTTP route definitions.
//!
//! # Route Structure
//!
//! - `GET /` - Dashboard `index.html` from `server.static_dir`
//! - `GET /health` - Health check
//! - `GET /api/salad-data` - Merged, time-ordered event feed
//! - `GET /api/events` - Alias of `/api/salad-data`
//! - `GET /api/errors` - Deduplicated, non-dismissed workload failures
//! - `POST /api/errors/{key}/dismiss` - Dismiss a workload failure by timestamp key
//!
//! Scans touch the filesystem synchronously, so handlers run them on the
//! blocking pool.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::Request;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use earnwatch_core::config::ServerConfig;
use earnwatch_core::event::{ErrorEvent, Event};
use earnwatch_ingest::DismissAck;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the API router without middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/salad-data", get(events))
        .route("/events", get(events))
        .route("/errors", get(errors))
        .route("/errors/{key}/dismiss", post(dismiss));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// Build the full application: routes plus request tracing and CORS.
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<_>| {
            tracing::span!(
                Level::INFO,
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        },
    ));

    if server.cors_allow_any {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run one scan cycle and return every cached event in time order.
///
/// Unreadable log files are skipped by the engine, so this never fails
/// because of a single bad file.
async fn events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let coordinator = Arc::clone(&state.coordinator);
    let report = tokio::task::spawn_blocking(move || coordinator.scan()).await?;
    Ok(Json(report.events))
}

async fn errors(State(state): State<AppState>) -> Result<Json<Vec<ErrorEvent>>, ApiError> {
    let feed = Arc::clone(&state.feed);
    let errors = tokio::task::spawn_blocking(move || feed.errors()).await?;
    Ok(Json(errors))
}

async fn dismiss(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DismissAck>, ApiError> {
    let feed = Arc::clone(&state.feed);
    let ack = tokio::task::spawn_blocking(move || feed.dismiss(&key)).await??;
    Ok(Json(ack))
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let Some(dir) = &state.static_dir else {
        return Err(ApiError::NotFound("dashboard is not configured".to_owned()));
    };

    let path = dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Ok(Html(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound(format!("{} not found", path.display())))
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to read {}", path.display()))
            .into()),
    }
}
