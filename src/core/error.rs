use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that abort a report run.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Required setting missing (webhook URL while posting is enabled).
    #[error("{0}")]
    Config(String),

    /// Cost Explorer call failed. Never retried.
    #[error("Error calling AWS Cost Explorer API: {source}")]
    Query {
        #[source]
        source: BoxError,
    },

    /// Webhook POST failed or returned a non-success status. Never retried.
    #[error("Teams notification failed: {0}")]
    Delivery(String),

    /// A service group lacked its key or metric.
    #[error("Malformed cost record: {0}")]
    MalformedRecord(String),

    #[error("Failed to serialize reports: {0}")]
    Output(#[from] serde_json::Error),
}

impl ReportError {
    pub fn query(source: impl Into<BoxError>) -> Self {
        Self::Query {
            source: source.into(),
        }
    }
}
