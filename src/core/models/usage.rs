use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single Cost Explorer metric value. Amounts arrive as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    pub amount: Option<String>,
    pub unit: Option<String>,
}

impl MetricValue {
    #[cfg(test)]
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            unit: Some("USD".to_string()),
        }
    }

    /// Parsed amount, `None` when missing or not a number.
    pub fn amount_f64(&self) -> Option<f64> {
        self.amount.as_deref()?.trim().parse().ok()
    }
}

pub type Metrics = HashMap<String, MetricValue>;

/// One group-by bucket, e.g. a single AWS service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsageGroup {
    #[serde(default)]
    pub keys: Vec<String>,
    pub metrics: Option<Metrics>,
}

#[cfg(test)]
impl UsageGroup {
    pub fn new(key: impl Into<String>, metric: &str, amount: impl Into<String>) -> Self {
        Self {
            keys: vec![key.into()],
            metrics: Some(HashMap::from([(metric.to_string(), MetricValue::new(amount))])),
        }
    }
}

/// The first `ResultsByTime` bucket of a `GetCostAndUsage` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsageRecord {
    /// Precomputed total. Cost Explorer leaves it empty when grouping.
    pub total: Option<Metrics>,
    #[serde(default)]
    pub groups: Vec<UsageGroup>,
    #[serde(default)]
    pub estimated: bool,
}
