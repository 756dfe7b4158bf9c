//! HTTP surface over [`BuildServer`].

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use bs_core::models::{BuildLogs, BuildStatus, HealthVerdict, ServerInfo, TriggerOutcome};
use bs_core::services::log_tailer::DEFAULT_TAIL_LINES;
use bs_core::BuildServer;

use crate::error::{ApiError, ApiResult};
use crate::ui::{self, StatusPage};

type AppState = Arc<BuildServer>;

pub fn router(server: Arc<BuildServer>) -> Router {
    Router::new()
        .route("/", get(web_ui))
        .route("/info", get(info))
        .route("/health", get(health))
        .route("/build/trigger/{repository}", post(trigger_build))
        .route("/build/status/{repository}", get(build_status))
        .route("/build/logs/{repository}", get(build_logs))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<i64>,
}

async fn trigger_build(
    State(server): State<AppState>,
    Path(repository): Path<String>,
) -> ApiResult<Json<TriggerOutcome>> {
    Ok(Json(server.trigger(&repository).await?))
}

async fn build_status(
    State(server): State<AppState>,
    Path(repository): Path<String>,
) -> ApiResult<Json<BuildStatus>> {
    Ok(Json(server.get_status(&repository).await?))
}

async fn build_logs(
    State(server): State<AppState>,
    Path(repository): Path<String>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> ApiResult<Json<BuildLogs>> {
    let Query(query) = query?;
    let requested = query.lines.unwrap_or(DEFAULT_TAIL_LINES);
    let logs = server.tail_log(&repository, requested).await?;
    Ok(Json(BuildLogs { logs }))
}

async fn health(State(server): State<AppState>) -> Json<HealthVerdict> {
    Json(server.health().await)
}

async fn info(State(server): State<AppState>) -> Json<ServerInfo> {
    Json(server.info().await)
}

async fn web_ui(State(server): State<AppState>) -> Html<String> {
    let config = server.config();
    if !config.enable_web_ui {
        return Html(ui::DISABLED_PAGE.to_string());
    }

    let (public_key, statuses) = tokio::join!(server.public_key(), server.statuses());
    Html(ui::render_status_page(&StatusPage {
        hostname: &config.hostname,
        api_port: config.api_port,
        cache_port: config.cache_port,
        public_key: &public_key,
        statuses: &statuses,
    }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
