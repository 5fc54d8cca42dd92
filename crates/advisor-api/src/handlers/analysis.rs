//! Recommendation analysis handler.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use advisor::{AnalysisEngine, AnalysisPeriod, ResourceKind, ResourceRecommendation};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of a recommendation request.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub resource_type: ResourceKind,
    /// Restrict the analysis to one resource. Changes the response shape
    /// from an array to a single object.
    #[serde(default)]
    pub resource_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Recommendation results: a single object when one resource was targeted,
/// an array otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendationResults {
    Single(Option<ResourceRecommendation>),
    Many(Vec<ResourceRecommendation>),
}

/// Response for a recommendation request.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub task_id: String,
    /// "completed" or "cancelled".
    pub status: &'static str,
    /// Progress line, e.g. "Processed 1/101".
    pub message: String,
    pub processed: usize,
    pub total: usize,
    /// Resource ids that failed and were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
    pub results: RecommendationResults,
}

/// `POST /llm/projects/{project_id}/recommendations`
///
/// Creates a task for the project, loads the resource inventory and runs
/// the cancellation-aware analysis loop. A cancel that arrived before the
/// task was created pre-cancels it via the registry's pending set, so the
/// response comes back immediately with zero processed resources.
pub async fn create_recommendations(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    if request.start_date > request.end_date {
        return Err(ApiError::InvalidDateRange(format!(
            "start_date {} is after end_date {}",
            request.start_date, request.end_date
        )));
    }

    let task_id = state.registry.create(&project_id, "llm_analysis");
    info!(
        task_id = %task_id,
        project_id = %project_id,
        resource_type = %request.resource_type,
        "analysis requested"
    );

    let mut resources = state
        .inventory
        .load(&project_id, request.resource_type)
        .await?;
    if let Some(resource_id) = &request.resource_id {
        resources.retain(|resource| &resource.resource_id == resource_id);
    }

    let provider = state.providers.require(&state.config.provider)?;
    let engine = AnalysisEngine::new(state.registry.clone(), provider, state.engine_settings())
        .with_cache(state.cache.clone());

    let period = AnalysisPeriod::new(request.start_date, request.end_date);
    let outcome = engine
        .run(&task_id, request.resource_type, &resources, &period)
        .await;

    // No-op when the task was cancelled; the flag is monotonic.
    state.registry.complete(&task_id);

    let message = outcome.progress();
    let status = if outcome.cancelled {
        "cancelled"
    } else {
        "completed"
    };

    let results = if request.resource_id.is_some() {
        RecommendationResults::Single(outcome.recommendations.into_iter().next())
    } else {
        RecommendationResults::Many(outcome.recommendations)
    };

    Ok(Json(RecommendationResponse {
        task_id,
        status,
        message,
        processed: outcome.processed,
        total: outcome.total,
        failed: outcome.failed,
        results,
    }))
}
