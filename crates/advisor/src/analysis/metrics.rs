//! Regrouping of flat ingestion metrics.
//!
//! The ingestion pipeline flattens utilization metrics into keys of the form
//! `metric_<Name>_<Stat>`, where `<Stat>` is `Avg`, `Max` or `MaxDate` and
//! `<Name>` may itself contain underscores and spaces
//! (`metric_UsedCapacity (GiB)_Avg`). The prompt wants one structured entry
//! per metric, so the stat suffix is split off the right.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources::ResourceData;

const METRIC_PREFIX: &str = "metric_";

/// Aggregated statistics for one named metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSummary {
    #[serde(rename = "Avg", skip_serializing_if = "Option::is_none")]
    pub avg: Option<Value>,
    #[serde(rename = "Max", skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(rename = "MaxDate", skip_serializing_if = "Option::is_none")]
    pub max_date: Option<Value>,
}

impl MetricSummary {
    fn is_empty(&self) -> bool {
        self.avg.is_none() && self.max.is_none() && self.max_date.is_none()
    }
}

/// Group the resource's flat `metric_*` keys into per-metric summaries.
/// Keys without the prefix or with an unknown stat suffix are ignored, and
/// metrics with no values present are dropped.
pub fn shape_metrics(resource: &ResourceData) -> BTreeMap<String, MetricSummary> {
    let mut shaped: BTreeMap<String, MetricSummary> = BTreeMap::new();

    for (key, value) in &resource.extra {
        let Some(stripped) = key.strip_prefix(METRIC_PREFIX) else {
            continue;
        };
        let Some((name, stat)) = stripped.rsplit_once('_') else {
            continue;
        };
        if name.is_empty() || value.is_null() {
            continue;
        }

        let entry = shaped.entry(name.to_string()).or_default();
        match stat {
            "Avg" => entry.avg = Some(value.clone()),
            "Max" => entry.max = Some(value.clone()),
            "MaxDate" => entry.max_date = Some(value.clone()),
            _ => {}
        }
    }

    shaped.retain(|_, summary| !summary.is_empty());
    shaped
}
