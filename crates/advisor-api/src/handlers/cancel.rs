//! Cancellation handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use advisor::TaskStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for a project-level cancel.
#[derive(Debug, Serialize)]
pub struct CancelProjectResponse {
    pub status: &'static str,
    pub message: String,
    pub project_id: String,
    pub cancelled_count: usize,
}

/// `POST /cancel-tasks/{project_id}` and
/// `POST /llm/projects/{project_id}/cancel-tasks`
///
/// Cancels every active task for the project. Always answers 200: when no
/// task exists yet the registry records a pending cancellation, and the
/// client treats the whole call as best-effort anyway — its local state is
/// already cleared by the time this lands.
pub async fn cancel_project_tasks(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Json<CancelProjectResponse> {
    let cancelled_count = state.registry.cancel_project(&project_id);

    let message = if cancelled_count > 0 {
        format!("Cancelled {cancelled_count} task(s) for project {project_id}")
    } else {
        format!("No active tasks found for project {project_id}")
    };
    info!(project_id = %project_id, cancelled_count, "project cancel request handled");

    Json(CancelProjectResponse {
        status: "ok",
        message,
        project_id,
        cancelled_count,
    })
}

/// Response for a single-task cancel.
#[derive(Debug, Serialize)]
pub struct CancelTaskResponse {
    pub status: &'static str,
    pub task_id: String,
    /// Whether this request flipped the task to cancelled. False when the
    /// task had already finished or was already cancelled.
    pub cancelled: bool,
    pub task_status: TaskStatus,
}

/// `POST /llm/tasks/{task_id}/cancel`
pub async fn cancel_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<CancelTaskResponse>, ApiError> {
    let cancelled = state.registry.cancel(&task_id);

    let Some(task) = state.registry.status(&task_id) else {
        return Err(ApiError::TaskNotFound(task_id));
    };

    if cancelled {
        info!(task_id = %task_id, "task cancelled by id");
    }

    Ok(Json(CancelTaskResponse {
        status: "ok",
        task_id,
        cancelled,
        task_status: task.status,
    }))
}
