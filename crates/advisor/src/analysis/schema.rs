//! Typed recommendation payload.
//!
//! Mirrors the strict JSON schema the analysis prompts demand from the
//! model. Field names are wire-format: `"for sku"` (with a space) is what
//! the dashboard consumes, so it stays.

use serde::{Deserialize, Serialize};

use super::forecast::CostForecast;

/// One recommendation with its estimated saving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    #[serde(default)]
    pub saving_pct: f64,
}

/// The recommendation block of an analysis answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationBlock {
    pub effective_recommendation: Recommendation,
    #[serde(default)]
    pub additional_recommendation: Vec<Recommendation>,
    /// Metric names (with values) that justify the decision, most critical
    /// first.
    #[serde(default)]
    pub base_of_recommendations: Vec<String>,
}

/// A metric event the model flagged as unusual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub metric_name: String,
    pub timestamp: String,
    #[serde(default)]
    pub value: f64,
    pub reason_short: String,
}

/// Assessment of the contracted unit price against the list price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealAssessment {
    Good,
    Bad,
    Unknown,
}

/// Contract evaluation block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDeal {
    pub assessment: DealAssessment,
    #[serde(rename = "for sku", default)]
    pub for_sku: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub monthly_saving_pct: f64,
    #[serde(default)]
    pub annual_saving_pct: f64,
}

/// Complete analysis answer for one resource, as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub recommendations: RecommendationBlock,
    pub cost_forecasting: CostForecast,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    pub contract_deal: ContractDeal,
}

/// A recommendation set stamped with the resource it describes and the
/// deterministic forecast computed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecommendation {
    pub resource_id: String,
    pub forecast_monthly: f64,
    pub forecast_annual: f64,
    #[serde(flatten)]
    pub analysis: RecommendationSet,
}
