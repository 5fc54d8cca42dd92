//! Cost analysis: forecasting, metric shaping, LLM response schema and the
//! cancellation-aware engine that drives per-resource recommendation calls.

/// Revision of the analysis prompts and their output schema. Part of every
/// cache key, so bumping it invalidates previously cached answers.
pub const PROMPT_SCHEMA_VERSION: &str = "v1";

pub mod engine;
pub mod forecast;
pub mod metrics;
pub mod parse;
pub mod schema;

pub use engine::{AnalysisEngine, AnalysisOutcome, EngineSettings};
pub use forecast::{extrapolate, CostForecast};
pub use metrics::{shape_metrics, MetricSummary};
pub use parse::extract_json_object;
pub use schema::{
    Anomaly, ContractDeal, DealAssessment, Recommendation, RecommendationBlock, RecommendationSet,
    ResourceRecommendation,
};
