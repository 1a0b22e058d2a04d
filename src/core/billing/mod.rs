//! Cost Explorer access and reduction of raw results into totals and
//! per-service costs.
//!
//! Fetching and reducing are split so the same [`UsageRecord`] can feed both
//! the total and the breakdown without a second round trip.

pub mod aws;
pub mod explorer;

use async_trait::async_trait;

use crate::core::error::ReportError;
use crate::core::models::report::Period;
use crate::core::models::usage::UsageRecord;

pub use explorer::CostExplorer;

pub const REGION_NAME: &str = "us-east-1";
pub const GRANULARITY: &str = "MONTHLY";
pub const COST_METRIC: &str = "AmortizedCost";
pub const SERVICE_GROUP_DIMENSION: &str = "SERVICE";
pub const RECORD_TYPE_DIMENSION: &str = "RECORD_TYPE";
pub const CREDIT_RECORD_TYPE: &str = "Credit";

/// A single `GetCostAndUsage` request.
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    pub period: Period,
    pub granularity: &'static str,
    pub metrics: Vec<&'static str>,
    /// Record type to filter out with a `Not` dimension expression.
    pub exclude_record_type: Option<&'static str>,
    /// Dimension to group by.
    pub group_by: Option<&'static str>,
}

/// Something that can answer a cost query with the first result bucket.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn get_cost_and_usage(&self, query: &CostQuery) -> Result<UsageRecord, ReportError>;
}
