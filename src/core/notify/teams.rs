//! Microsoft Teams incoming-webhook channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ReportChannel;
use crate::core::error::ReportError;
use crate::core::formatter::format_body;
use crate::core::models::report::Report;

const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const ADAPTIVE_CARD_VERSION: &str = "1.2";

pub struct TeamsChannel {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl TeamsChannel {
    #[must_use]
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    /// Adaptive Card with a single markdown text block.
    fn format_payload(title: &str, lines: &[String]) -> TeamsPayload {
        TeamsPayload {
            attachments: vec![TeamsAttachment {
                content_type: ADAPTIVE_CARD_CONTENT_TYPE,
                content: AdaptiveCard {
                    schema: ADAPTIVE_CARD_SCHEMA,
                    card_type: "AdaptiveCard",
                    version: ADAPTIVE_CARD_VERSION,
                    body: vec![TextBlock {
                        block_type: "TextBlock",
                        text: format!("### {title}\n\n{}", format_body(lines)),
                        wrap: true,
                        markdown: true,
                    }],
                },
            }],
        }
    }
}

#[async_trait]
impl ReportChannel for TeamsChannel {
    fn name(&self) -> &'static str {
        "teams"
    }

    async fn send(&self, report: &Report) -> Result<(), ReportError> {
        let webhook_url = self.webhook_url.as_deref().ok_or_else(|| {
            ReportError::Config("TEAMS_WEBHOOK_URL is not set in the environment variables.".into())
        })?;

        let payload = Self::format_payload(&report.title, &report.lines);

        debug!(channel = "teams", title = %report.title, "Sending report");

        // reqwest's `.json()` sets Content-Type: application/json
        let response = self
            .client
            .post(webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(channel = "teams", error = %e, "Teams webhook request failed");
                ReportError::Delivery(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            info!(channel = "teams", "Report posted to Teams");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(
                channel = "teams",
                status = %status,
                body = %body,
                "Teams webhook returned an error"
            );
            Err(ReportError::Delivery(format!("Teams returned {status}: {body}")))
        }
    }
}

// =============================================================================
// Adaptive Card payload
// =============================================================================

#[derive(Debug, Serialize)]
struct TeamsPayload {
    attachments: Vec<TeamsAttachment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamsAttachment {
    content_type: &'static str,
    content: AdaptiveCard,
}

#[derive(Debug, Serialize)]
struct AdaptiveCard {
    #[serde(rename = "$schema")]
    schema: &'static str,
    #[serde(rename = "type")]
    card_type: &'static str,
    version: &'static str,
    body: Vec<TextBlock>,
}

#[derive(Debug, Serialize)]
struct TextBlock {
    #[serde(rename = "type")]
    block_type: &'static str,
    text: String,
    wrap: bool,
    markdown: bool,
}
