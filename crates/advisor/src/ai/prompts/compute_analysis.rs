//! Virtual machine analysis prompt template.

use serde::Serialize;

use crate::analysis::forecast::CostForecast;
use crate::analysis::metrics::shape_metrics;
use crate::resources::{AnalysisPeriod, ResourceData};

use super::PromptTemplate;

/// Context for the compute analysis prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ComputeAnalysisContext {
    pub resource_id: String,
    pub resource_name: String,
    pub instance_type: String,
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

impl ComputeAnalysisContext {
    pub fn new(resource: &ResourceData, period: &AnalysisPeriod, forecast: &CostForecast) -> Self {
        let metrics = shape_metrics(resource);
        Self {
            resource_id: resource.resource_id.clone(),
            resource_name: resource.display_name().to_string(),
            instance_type: resource
                .instance_type
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

/// Get the compute analysis template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new("compute-analysis", SYSTEM_PROMPT, USER_PROMPT)
}

const SYSTEM_PROMPT: &str = "You are an Azure FinOps & VM Optimization Expert. \
You produce ONLY a valid JSON object based strictly on the schema you are given. \
You never output text outside the JSON and never use markdown.";

const USER_PROMPT: &str = r#"Analyze the following Virtual Machine data and metrics. Produce ONLY a valid JSON object based strictly on the schema shown below.

ANALYSIS CONTEXT:
- Resource ID: {{resource_id}}
- VM Name: {{resource_name}}
- Analysis Period: {{start_date}} to {{end_date}} ({{duration_days}} days)
- Total Billed Cost: ${{billed_cost}}

STRUCTURED UTILIZATION METRICS (Analyze this JSON structure):
{{metrics_json}}

INSTRUCTIONS:
1. **Primary Recommendation & Savings:** Define the 'effective_recommendation' text with high detail. Based on your rightsizing or optimization recommendation, CALCULATE A REALISTIC 'saving_pct' (0-100 range) proportional to the billed cost. This is the primary saving value.
2. **Recommendation Basis (Metrics):** Analyze the STRUCTURED UTILIZATION METRICS and populate 'base_of_recommendations' with ALL relevant metric names and the values that justify the optimization decision. The most critical metric MUST be the first entry.
3. **Rightsizing Logic:** Recommend downsizing when 'Percentage CPU' Avg is < 20 AND Max is < 75. If CPU Max > 90, include a high-risk note (avoid rightsizing) and focus on the anomaly.
4. **Anomalies:** Review the full set of metrics and identify 2 to 3 significant spikes, drops, or unusual metric values. Populate the 'anomalies' array with these events, using the MaxDate as the timestamp.
5. **Cost Forecasting:** Must use the pre-calculated values: monthly = {{monthly_forecast}}, annually = {{annual_forecast}}.
6. **Contract Evaluation:** Compare contracted_unit_price ({{contracted_unit_price}}) vs general instance_type {{instance_type}}. Return assessment as: "good", "bad", or "unknown".
7. Use the EXACT schema below. Do NOT change any field names or structure.

STRICT JSON OUTPUT SCHEMA:

{
  "recommendations": {
    "effective_recommendation": { "text": "...", "saving_pct": 12.3 },
    "additional_recommendation": [
      {"text": "...", "saving_pct": 3.4},
      {"text": "...", "saving_pct": 5.0}
    ],
    "base_of_recommendations": ["Percentage CPU: value", "Available Memory Bytes: value"]
  },
  "cost_forecasting": {
    "monthly": {{monthly_forecast}},
    "annually": {{annual_forecast}}
  },
  "anomalies": [
    {
      "metric_name": "...",
      "timestamp": "YYYY-MM-DD HH24:MI",
      "value": 123.45,
      "reason_short": "..."
    }
  ],
  "contract_deal": {
    "assessment": "good" | "bad" | "unknown",
    "for sku": "{{instance_type}}",
    "reason": "...",
    "monthly_saving_pct": 1.2,
    "annual_saving_pct": 14.4
  }
}"#;
