//! Resource data model shared across the analysis pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of cloud resource an analysis targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Storage accounts
    Storage,
    /// Virtual machines
    Compute,
}

impl ResourceKind {
    /// Stable lowercase name, used for inventory file names and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Compute => "compute",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date range an analysis covers (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AnalysisPeriod {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }
}

fn default_duration_days() -> u32 {
    30
}

/// One resource as produced by the ingestion pipeline.
///
/// Billing fields are typed; utilization metrics arrive as flat
/// `metric_<Name>_<Stat>` keys and are kept in `extra` until the analysis
/// step regroups them (see [`crate::analysis::metrics`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceData {
    pub resource_id: String,
    #[serde(default)]
    pub resource_name: Option<String>,
    /// Storage SKU (e.g. "Standard_LRS"), when the resource is a storage account.
    #[serde(default)]
    pub sku: Option<String>,
    /// Storage access tier (Hot/Cool/Archive).
    #[serde(default)]
    pub access_tier: Option<String>,
    /// VM instance type (e.g. "Standard_D4s_v3"), when the resource is compute.
    #[serde(default)]
    pub instance_type: Option<String>,
    /// Total billed cost over the analysis window, in USD.
    #[serde(default)]
    pub billed_cost: f64,
    /// Length of the analysis window in days.
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
    /// Unit price negotiated in the customer contract, if known.
    #[serde(default)]
    pub contracted_unit_price: Option<f64>,
    /// Flat ingestion keys, including the `metric_*` triplets.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ResourceData {
    /// Display name falling back to the resource id.
    pub fn display_name(&self) -> &str {
        self.resource_name.as_deref().unwrap_or(&self.resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_names() {
        assert_eq!(ResourceKind::Storage.as_str(), "storage");
        assert_eq!(ResourceKind::Compute.to_string(), "compute");
    }

    #[test]
    fn test_resource_data_defaults_and_flatten() {
        let json = serde_json::json!({
            "resource_id": "/subscriptions/s1/st-account-1",
            "billed_cost": 42.5,
            "metric_UsedCapacity (GiB)_Avg": 118.2,
            "metric_UsedCapacity (GiB)_Max": 120.0
        });

        let resource: ResourceData = serde_json::from_value(json).unwrap();
        assert_eq!(resource.duration_days, 30);
        assert!(resource.resource_name.is_none());
        assert_eq!(resource.extra.len(), 2);
        assert_eq!(resource.display_name(), "/subscriptions/s1/st-account-1");
    }
}
