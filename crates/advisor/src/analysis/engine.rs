//! Cancellation-aware analysis engine.
//!
//! Walks an ordered resource list and asks the configured LLM provider for
//! a recommendation per resource. The task registry is polled before each
//! resource and again right before the provider call; a cancel observed at
//! either point stops the loop and reports partial progress. One resource
//! failing does not abort the loop — cancellation is the only deliberate
//! early exit.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ai::prompts::{compute_analysis, storage_analysis, PromptError};
use crate::ai::{GenerateOptions, LlmError, LlmProvider};
use crate::cache::{CacheKey, RecommendationCache};
use crate::resources::{AnalysisPeriod, ResourceData, ResourceKind};
use crate::tasks::TaskRegistry;

use super::forecast::extrapolate;
use super::parse::extract_json_object;
use super::schema::{RecommendationSet, ResourceRecommendation};

/// Errors for a single resource analysis. The engine recovers from all of
/// them by skipping the resource.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Prompt render failed: {0}")]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("No JSON object in model answer")]
    NoJsonObject,

    #[error("Malformed model answer: {0}")]
    MalformedAnswer(#[from] serde_json::Error),
}

/// Engine configuration resolved at request time.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Cloud platform tag, part of the cache key.
    pub platform: String,
    /// Prompt/schema revision; bumping it invalidates cached answers.
    pub schema_version: String,
    /// Generation options forwarded to the provider.
    pub options: GenerateOptions,
}

/// Result of one analysis run, possibly partial.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub recommendations: Vec<ResourceRecommendation>,
    /// Resource ids whose analysis failed and was skipped.
    pub failed: Vec<String>,
    /// Resources the loop got through before finishing or being cancelled.
    pub processed: usize,
    pub total: usize,
    pub cancelled: bool,
}

impl AnalysisOutcome {
    /// Human-readable progress line, e.g. "Processed 1/101".
    pub fn progress(&self) -> String {
        format!("Processed {}/{}", self.processed, self.total)
    }
}

/// Drives per-resource recommendation calls for one task.
pub struct AnalysisEngine {
    registry: Arc<TaskRegistry>,
    provider: Arc<dyn LlmProvider>,
    cache: Option<RecommendationCache>,
    settings: EngineSettings,
}

impl AnalysisEngine {
    pub fn new(
        registry: Arc<TaskRegistry>,
        provider: Arc<dyn LlmProvider>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            provider,
            cache: None,
            settings,
        }
    }

    /// Attach a recommendation cache. Cached answers short-circuit the
    /// provider call for their resource.
    pub fn with_cache(mut self, cache: RecommendationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Run the analysis loop for `task_id` over `resources`, in order.
    pub async fn run(
        &self,
        task_id: &str,
        kind: ResourceKind,
        resources: &[ResourceData],
        period: &AnalysisPeriod,
    ) -> AnalysisOutcome {
        let total = resources.len();
        let mut recommendations = Vec::new();
        let mut failed = Vec::new();
        let mut processed = 0usize;
        let mut cancelled = false;

        for resource in resources {
            if self.registry.is_cancelled(task_id) {
                cancelled = true;
                break;
            }

            let key = self.cache_key(kind, resource, period);
            if let Some(hit) = self.lookup(&key, &resource.resource_id).await {
                recommendations.push(hit);
                processed += 1;
                continue;
            }

            // The provider call is the expensive part; look at the flag once
            // more right before paying for it.
            if self.registry.is_cancelled(task_id) {
                cancelled = true;
                break;
            }

            match self.analyze_resource(kind, resource, period).await {
                Ok(recommendation) => {
                    self.store(&key, &recommendation).await;
                    recommendations.push(recommendation);
                }
                Err(error) => {
                    warn!(
                        resource_id = %resource.resource_id,
                        error = %error,
                        "resource analysis failed, skipping"
                    );
                    failed.push(resource.resource_id.clone());
                }
            }
            processed += 1;
        }

        if cancelled {
            info!(task_id = %task_id, processed, total, "analysis cancelled, reporting partial progress");
        } else {
            debug!(task_id = %task_id, processed, total, "analysis finished");
        }

        AnalysisOutcome {
            recommendations,
            failed,
            processed,
            total,
            cancelled,
        }
    }

    fn cache_key(
        &self,
        kind: ResourceKind,
        resource: &ResourceData,
        period: &AnalysisPeriod,
    ) -> CacheKey {
        CacheKey {
            platform: self.settings.platform.clone(),
            schema_version: self.settings.schema_version.clone(),
            resource_type: kind.as_str().to_string(),
            resource_id: resource.resource_id.clone(),
            period_start: period.start_date,
            period_end: period.end_date,
        }
    }

    async fn lookup(&self, key: &CacheKey, resource_id: &str) -> Option<ResourceRecommendation> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(Some(hit)) => {
                debug!(resource_id = %resource_id, "recommendation served from cache");
                Some(hit)
            }
            Ok(None) => None,
            Err(error) => {
                // A broken cache degrades to a fresh provider call.
                warn!(resource_id = %resource_id, error = %error, "cache lookup failed");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, recommendation: &ResourceRecommendation) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if let Err(error) = cache.put(key, recommendation).await {
            warn!(
                resource_id = %recommendation.resource_id,
                error = %error,
                "failed to store recommendation in cache"
            );
        }
    }

    async fn analyze_resource(
        &self,
        kind: ResourceKind,
        resource: &ResourceData,
        period: &AnalysisPeriod,
    ) -> Result<ResourceRecommendation, AnalysisError> {
        let forecast = extrapolate(resource.billed_cost, resource.duration_days);

        let rendered = match kind {
            ResourceKind::Storage => {
                let context =
                    storage_analysis::StorageAnalysisContext::new(resource, period, &forecast);
                storage_analysis::template().render(&context)?
            }
            ResourceKind::Compute => {
                let context =
                    compute_analysis::ComputeAnalysisContext::new(resource, period, &forecast);
                compute_analysis::template().render(&context)?
            }
        };

        let response = self
            .provider
            .generate(
                &self.settings.model,
                &rendered.system,
                &rendered.user,
                &self.settings.options,
            )
            .await?;

        let json = extract_json_object(&response.text).ok_or(AnalysisError::NoJsonObject)?;
        let analysis: RecommendationSet = serde_json::from_str(json)?;

        debug!(
            resource_id = %resource.resource_id,
            tokens = response.usage.total_tokens(),
            "resource analysis completed"
        );

        Ok(ResourceRecommendation {
            resource_id: resource.resource_id.clone(),
            forecast_monthly: forecast.monthly,
            forecast_annual: forecast.annually,
            analysis,
        })
    }
}
