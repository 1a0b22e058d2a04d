//! [`BillingApi`] backed by the AWS SDK. Credentials come from the default
//! provider chain (env, profile, SSO, instance metadata, ...).

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_costexplorer::config::Region;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::types::{
    DateInterval, Dimension, DimensionValues, Expression, Granularity, GroupDefinition,
    GroupDefinitionType, MetricValue as SdkMetricValue, ResultByTime,
};
use aws_sdk_costexplorer::Client;
use tracing::debug;

use super::{BillingApi, CostQuery, RECORD_TYPE_DIMENSION, REGION_NAME};
use crate::core::error::ReportError;
use crate::core::models::usage::{MetricValue, Metrics, UsageGroup, UsageRecord};

pub struct AwsCostExplorer {
    client: Client,
}

impl AwsCostExplorer {
    /// Load shared AWS config for the Cost Explorer region.
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(REGION_NAME))
            .load()
            .await;
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl BillingApi for AwsCostExplorer {
    async fn get_cost_and_usage(&self, query: &CostQuery) -> Result<UsageRecord, ReportError> {
        let time_period = DateInterval::builder()
            .start(query.period.start.format("%Y-%m-%d").to_string())
            .end(query.period.end.format("%Y-%m-%d").to_string())
            .build()
            .map_err(ReportError::query)?;

        let group_by = query.group_by.map(|key| {
            vec![GroupDefinition::builder()
                .r#type(GroupDefinitionType::Dimension)
                .key(key)
                .build()]
        });

        let filter = query.exclude_record_type.map(|record_type| {
            Expression::builder()
                .not(
                    Expression::builder()
                        .dimensions(
                            DimensionValues::builder()
                                .key(Dimension::from(RECORD_TYPE_DIMENSION))
                                .values(record_type)
                                .build(),
                        )
                        .build(),
                )
                .build()
        });

        let output = self
            .client
            .get_cost_and_usage()
            .time_period(time_period)
            .granularity(Granularity::from(query.granularity))
            .set_metrics(Some(query.metrics.iter().map(|m| m.to_string()).collect()))
            .set_group_by(group_by)
            .set_filter(filter)
            .send()
            .await
            .map_err(|e| ReportError::query(DisplayErrorContext(e).to_string()))?;

        let first = output
            .results_by_time()
            .first()
            .ok_or_else(|| ReportError::query("response contained no ResultsByTime"))?;

        debug!(
            groups = first.groups().len(),
            estimated = first.estimated(),
            "Cost Explorer responded"
        );
        Ok(to_usage_record(first))
    }
}

fn to_metrics(metrics: &HashMap<String, SdkMetricValue>) -> Metrics {
    metrics
        .iter()
        .map(|(name, value)| {
            (
                name.clone(),
                MetricValue {
                    amount: value.amount().map(str::to_string),
                    unit: value.unit().map(str::to_string),
                },
            )
        })
        .collect()
}

fn to_usage_record(result: &ResultByTime) -> UsageRecord {
    UsageRecord {
        total: result.total().map(to_metrics),
        groups: result
            .groups()
            .iter()
            .map(|group| UsageGroup {
                keys: group.keys().to_vec(),
                metrics: group.metrics().map(to_metrics),
            })
            .collect(),
        estimated: result.estimated(),
    }
}
