use tracing::{debug, error, info, warn};

use super::{
    BillingApi, CostQuery, COST_METRIC, CREDIT_RECORD_TYPE, GRANULARITY, SERVICE_GROUP_DIMENSION,
};
use crate::core::error::ReportError;
use crate::core::models::report::{Period, ServiceCost};
use crate::core::models::usage::{Metrics, UsageRecord};

/// Billing client adapter over a [`BillingApi`].
pub struct CostExplorer<'a> {
    api: &'a dyn BillingApi,
}

impl<'a> CostExplorer<'a> {
    pub fn new(api: &'a dyn BillingApi) -> Self {
        Self { api }
    }

    /// Build the query for `period`. Credits are filtered out unless
    /// `include_credit` is set.
    pub fn query(period: Period, include_credit: bool, group_by_service: bool) -> CostQuery {
        CostQuery {
            period,
            granularity: GRANULARITY,
            metrics: vec![COST_METRIC],
            exclude_record_type: (!include_credit).then_some(CREDIT_RECORD_TYPE),
            group_by: group_by_service.then_some(SERVICE_GROUP_DIMENSION),
        }
    }

    /// Fetch the amortized cost for `period`. One attempt, no retry.
    pub async fn fetch(
        &self,
        period: Period,
        include_credit: bool,
        group_by_service: bool,
    ) -> Result<UsageRecord, ReportError> {
        let query = Self::query(period, include_credit, group_by_service);
        debug!(
            start = %period.start,
            end = %period.end,
            include_credit,
            group_by_service,
            "Querying cost and usage"
        );

        self.api.get_cost_and_usage(&query).await.map_err(|e| {
            error!(error = %e, "Failed to fetch cost and usage data");
            e
        })
    }

    /// Total amortized cost of `record`.
    ///
    /// Uses the precomputed total when Cost Explorer provides one, otherwise
    /// sums the groups with negative amounts clamped to zero. Missing or
    /// malformed metric data yields `0.0`.
    pub fn total_of(record: &UsageRecord) -> f64 {
        match record.total.as_ref().filter(|t| !t.is_empty()) {
            Some(total) => metric_amount(total).unwrap_or_else(|| {
                warn!(metric = COST_METRIC, record = ?record, "Metric is missing from total");
                0.0
            }),
            None => {
                let mut sum = 0.0;
                for group in &record.groups {
                    match group.metrics.as_ref().and_then(metric_amount) {
                        Some(amount) => sum += amount.max(0.0),
                        None => {
                            warn!(metric = COST_METRIC, record = ?record, "Metric is missing from group");
                            return 0.0;
                        }
                    }
                }
                info!("Calculated total cost from groups: {sum:.2} USD");
                sum
            }
        }
    }

    /// One [`ServiceCost`] per group, amounts unclamped.
    pub fn service_costs_of(record: &UsageRecord) -> Result<Vec<ServiceCost>, ReportError> {
        record
            .groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let service_name = group.keys.first().cloned().ok_or_else(|| {
                    ReportError::MalformedRecord(format!("group {i} has no keys"))
                })?;
                let billing = group.metrics.as_ref().and_then(metric_amount).ok_or_else(|| {
                    ReportError::MalformedRecord(format!(
                        "group '{service_name}' has no usable {COST_METRIC} amount"
                    ))
                })?;
                Ok(ServiceCost {
                    service_name,
                    billing,
                })
            })
            .collect()
    }
}

fn metric_amount(metrics: &Metrics) -> Option<f64> {
    metrics.get(COST_METRIC)?.amount_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::usage::{MetricValue, UsageGroup};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingApi {
        response: Option<UsageRecord>,
        queries: Mutex<Vec<CostQuery>>,
    }

    impl RecordingApi {
        fn returning(record: UsageRecord) -> Self {
            Self {
                response: Some(record),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BillingApi for RecordingApi {
        async fn get_cost_and_usage(&self, query: &CostQuery) -> Result<UsageRecord, ReportError> {
            self.queries.lock().unwrap().push(query.clone());
            self.response
                .clone()
                .ok_or_else(|| ReportError::query("ExpiredTokenException"))
        }
    }

    fn period() -> Period {
        Period {
            start: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 28).unwrap(),
        }
    }

    fn total(amount: &str) -> Option<Metrics> {
        Some(HashMap::from([(COST_METRIC.to_string(), MetricValue::new(amount))]))
    }

    fn groups(entries: &[(&str, &str)]) -> Vec<UsageGroup> {
        entries
            .iter()
            .map(|(name, amount)| UsageGroup::new(*name, COST_METRIC, *amount))
            .collect()
    }

    #[tokio::test]
    async fn fetch_with_credit_sends_no_filter() {
        let api = RecordingApi::returning(UsageRecord::default());
        let explorer = CostExplorer::new(&api);

        explorer.fetch(period(), true, false).await.unwrap();

        let queries = api.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].period, period());
        assert_eq!(queries[0].granularity, "MONTHLY");
        assert_eq!(queries[0].metrics, vec!["AmortizedCost"]);
        assert_eq!(queries[0].exclude_record_type, None);
        assert_eq!(queries[0].group_by, None);
    }

    #[tokio::test]
    async fn fetch_without_credit_excludes_credit_records() {
        let api = RecordingApi::returning(UsageRecord::default());
        let explorer = CostExplorer::new(&api);

        explorer.fetch(period(), false, true).await.unwrap();

        let queries = api.queries.lock().unwrap();
        assert_eq!(queries[0].exclude_record_type, Some("Credit"));
        assert_eq!(queries[0].group_by, Some("SERVICE"));
    }

    #[tokio::test]
    async fn fetch_returns_record_verbatim() {
        let record = UsageRecord {
            total: total("123.45"),
            groups: groups(&[("Amazon EC2", "100.0"), ("Amazon S3", "23.45")]),
            estimated: false,
        };
        let api = RecordingApi::returning(record.clone());
        let fetched = CostExplorer::new(&api).fetch(period(), true, true).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn fetch_failure_is_query_error() {
        let api = RecordingApi::failing();
        let err = CostExplorer::new(&api)
            .fetch(period(), true, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Query { .. }));
        assert_eq!(api.queries.lock().unwrap().len(), 1);
    }

    #[test]
    fn total_of_prefers_precomputed_total() {
        let record = UsageRecord {
            total: total("45.67"),
            groups: vec![],
            estimated: false,
        };
        assert_eq!(CostExplorer::total_of(&record), 45.67);
    }

    #[test]
    fn total_of_zero_total_wins_over_groups() {
        let record = UsageRecord {
            total: total("0"),
            groups: groups(&[("Amazon EC2", "100.0"), ("Amazon S3", "23.45")]),
            estimated: false,
        };
        assert_eq!(CostExplorer::total_of(&record), 0.0);
    }

    #[test]
    fn total_of_sums_groups_without_total() {
        let record = UsageRecord {
            total: None,
            groups: groups(&[("Amazon EC2", "12.3"), ("Amazon S3", "0.7")]),
            estimated: false,
        };
        assert!((CostExplorer::total_of(&record) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn total_of_empty_total_falls_back_to_groups() {
        let record = UsageRecord {
            total: Some(HashMap::new()),
            groups: groups(&[("Amazon EC2", "100.0"), ("Amazon S3", "23.45")]),
            estimated: false,
        };
        assert!((CostExplorer::total_of(&record) - 123.45).abs() < 1e-9);
    }

    #[test]
    fn total_of_clamps_negative_groups() {
        let record = UsageRecord {
            total: None,
            groups: groups(&[("Amazon EC2", "10.0"), ("Credit", "-25.0"), ("Amazon S3", "2.5")]),
            estimated: false,
        };
        assert!((CostExplorer::total_of(&record) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn total_of_missing_metric_soft_fails_to_zero() {
        let record = UsageRecord {
            total: Some(HashMap::from([(
                "UnblendedCost".to_string(),
                MetricValue::new("9.99"),
            )])),
            groups: vec![],
            estimated: false,
        };
        assert_eq!(CostExplorer::total_of(&record), 0.0);

        let record = UsageRecord {
            total: None,
            groups: vec![UsageGroup {
                keys: vec!["Amazon EC2".into()],
                metrics: None,
            }],
            estimated: false,
        };
        assert_eq!(CostExplorer::total_of(&record), 0.0);
    }

    #[test]
    fn total_of_unparsable_amount_soft_fails_to_zero() {
        let record = UsageRecord {
            total: total("not-a-number"),
            groups: vec![],
            estimated: false,
        };
        assert_eq!(CostExplorer::total_of(&record), 0.0);
    }

    #[test]
    fn service_costs_preserve_order_and_sign() {
        let record = UsageRecord {
            total: None,
            groups: groups(&[("Amazon EC2", "100.0"), ("Tax", "-1.5"), ("Amazon S3", "23.45")]),
            estimated: false,
        };
        let costs = CostExplorer::service_costs_of(&record).unwrap();
        assert_eq!(
            costs,
            vec![
                ServiceCost { service_name: "Amazon EC2".into(), billing: 100.0 },
                ServiceCost { service_name: "Tax".into(), billing: -1.5 },
                ServiceCost { service_name: "Amazon S3".into(), billing: 23.45 },
            ]
        );
    }

    #[test]
    fn service_costs_reject_group_without_metric() {
        let record = UsageRecord {
            total: None,
            groups: vec![UsageGroup {
                keys: vec!["Amazon EC2".into()],
                metrics: Some(HashMap::new()),
            }],
            estimated: false,
        };
        let err = CostExplorer::service_costs_of(&record).unwrap_err();
        assert!(matches!(err, ReportError::MalformedRecord(_)));
        assert!(err.to_string().contains("Amazon EC2"));
    }

    #[test]
    fn service_costs_reject_group_without_keys() {
        let record = UsageRecord {
            total: None,
            groups: vec![UsageGroup {
                keys: vec![],
                metrics: Some(HashMap::from([(COST_METRIC.to_string(), MetricValue::new("1"))])),
            }],
            estimated: false,
        };
        assert!(CostExplorer::service_costs_of(&record).is_err());
    }

    #[test]
    fn reductions_are_idempotent() {
        let record = UsageRecord {
            total: None,
            groups: groups(&[("Amazon EC2", "100.0"), ("Amazon S3", "23.45")]),
            estimated: false,
        };
        assert_eq!(CostExplorer::total_of(&record), CostExplorer::total_of(&record));
        assert_eq!(
            CostExplorer::service_costs_of(&record).unwrap(),
            CostExplorer::service_costs_of(&record).unwrap()
        );
    }
}
