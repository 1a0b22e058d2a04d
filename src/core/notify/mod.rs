//! Report delivery channels.

pub mod teams;

use async_trait::async_trait;

use crate::core::error::ReportError;
use crate::core::models::report::Report;

pub use teams::TeamsChannel;

/// A destination a finished report can be posted to.
#[async_trait]
pub trait ReportChannel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one report. Called once per report, never retried.
    async fn send(&self, report: &Report) -> Result<(), ReportError>;
}
