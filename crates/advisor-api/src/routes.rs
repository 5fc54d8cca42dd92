//! Router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{analysis, cancel, tasks};
use crate::state::AppState;

/// Build the advisor API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Fast-path cancel used by the dashboard's Reset button. Kept
        // outside the authenticated /llm tree so the client can fire it
        // without waiting on token refresh.
        .route("/cancel-tasks/{project_id}", post(cancel::cancel_project_tasks))
        .route(
            "/llm/projects/{project_id}/cancel-tasks",
            post(cancel::cancel_project_tasks),
        )
        .route(
            "/llm/projects/{project_id}/recommendations",
            post(analysis::create_recommendations),
        )
        .route("/llm/tasks/{task_id}/cancel", post(cancel::cancel_task))
        .route("/llm/tasks/{task_id}", get(tasks::get_task))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness handler.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
