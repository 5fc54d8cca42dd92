//! Task introspection handler.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use advisor::Task;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /llm/tasks/{task_id}`
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    state
        .registry
        .status(&task_id)
        .map(Json)
        .ok_or(ApiError::TaskNotFound(task_id))
}
