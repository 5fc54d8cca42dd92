//! Storage account analysis prompt template.

use serde::Serialize;

use crate::analysis::forecast::CostForecast;
use crate::analysis::metrics::shape_metrics;
use crate::resources::{AnalysisPeriod, ResourceData};

use super::PromptTemplate;

/// Context for the storage analysis prompt.
#[derive(Debug, Clone, Serialize)]
pub struct StorageAnalysisContext {
    pub resource_id: String,
    pub sku: String,
    pub access_tier: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: u32,
    /// Billed cost, pre-formatted to two decimals.
    pub billed_cost: String,
    pub contracted_unit_price: String,
    pub monthly_forecast: String,
    pub annual_forecast: String,
    /// Shaped utilization metrics as pretty-printed JSON.
    pub metrics_json: String,
}

impl StorageAnalysisContext {
    pub fn new(resource: &ResourceData, period: &AnalysisPeriod, forecast: &CostForecast) -> Self {
        let metrics = shape_metrics(resource);
        Self {
            resource_id: resource.resource_id.clone(),
            sku: resource.sku.clone().unwrap_or_else(|| "N/A".to_string()),
            access_tier: resource
                .access_tier
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            start_date: period.start_date.to_string(),
            end_date: period.end_date.to_string(),
            duration_days: resource.duration_days,
            billed_cost: format!("{:.2}", resource.billed_cost),
            contracted_unit_price: resource
                .contracted_unit_price
                .map_or_else(|| "N/A".to_string(), |price| format!("{price}")),
            monthly_forecast: format!("{:.2}", forecast.monthly),
            annual_forecast: format!("{:.2}", forecast.annually),
            metrics_json: serde_json::to_string_pretty(&metrics)
                .unwrap_or_else(|_| "{}".to_string()),
        }
    }
}

/// Get the storage analysis template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new("storage-analysis", SYSTEM_PROMPT, USER_PROMPT)
}

const SYSTEM_PROMPT: &str = "You are an Azure FinOps & Cost Optimization Expert focused on Storage. \
You produce ONLY a valid JSON object following the schema you are given. \
You never output natural language commentary outside the JSON, and never use markdown or code fencing.";

const USER_PROMPT: &str = r#"Analyze the following Storage Account data and the provided metrics. Produce ONLY a valid JSON object according to the schema provided below.

ANALYSIS CONTEXT:
- Resource ID: {{resource_id}}
- SKU/Tier: {{sku}} ({{access_tier}})
- Analysis Period: {{start_date}} to {{end_date}} ({{duration_days}} days)
- Total Billed Cost for Period: ${{billed_cost}}

STRUCTURED UTILIZATION METRICS (Analyze this JSON structure):
{{metrics_json}}

INSTRUCTIONS FOR ANALYSIS:
1. **Primary Recommendation & Savings:** Define the 'effective_recommendation' text with high detail. Based on your recommendation, CALCULATE A REALISTIC 'saving_pct' (0-100 range) proportional to the billed cost. This is the primary saving value.
2. **Recommendation Basis (Metrics):** Analyze the STRUCTURED UTILIZATION METRICS and populate 'base_of_recommendations' with ALL relevant metric names and the values that justify the optimization decision. The most critical metric MUST be the first entry.
3. **Tiering Logic:** If the access tier is Hot, evaluate whether the 'UsedCapacity (GiB)' Avg indicates a large static block. If so, recommend moving data to Cool/Archive. Estimate saving_pct based on typical ratios (Cool is roughly 30% of Hot cost, Archive roughly 5% of Hot).
4. **Anomalies:** Review the full set of metrics and identify 2 to 3 significant spikes, drops, or unusual metric values. Populate the 'anomalies' array with these events, using the MaxDate as the timestamp.
5. **Cost Forecasting:** Perfectly follow the pre-calculated values: monthly = {{monthly_forecast}}, annually = {{annual_forecast}}.
6. **Contract Evaluation:** Compare contracted_unit_price ({{contracted_unit_price}}) vs general SKU {{sku}}. Return assessment as: "good", "bad", or "unknown".
7. Output MUST strictly follow the schema below.

STRICT JSON OUTPUT SCHEMA (do not modify keys, types, or structure):

{
  "recommendations": {
    "effective_recommendation": { "text": "...", "saving_pct": 12.3 },
    "additional_recommendation": [
      {"text": "...", "saving_pct": 3.4},
      {"text": "...", "saving_pct": 5.0}
    ],
    "base_of_recommendations": ["UsedCapacity (GiB): value", "Transactions (count): value"]
  },
  "cost_forecasting": {
    "monthly": {{monthly_forecast}},
    "annually": {{annual_forecast}}
  },
  "anomalies": [
    {
      "metric_name": "...",
      "timestamp": "YYYY-MM-DD",
      "value": 123.45,
      "reason_short": "..."
    }
  ],
  "contract_deal": {
    "assessment": "good" | "bad" | "unknown",
    "for sku": "{{sku}}",
    "reason": "...",
    "monthly_saving_pct": 1.2,
    "annual_saving_pct": 14.4
  }
}"#;
