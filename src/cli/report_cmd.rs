use chrono::NaiveDate;
use tracing::info;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::billing::{BillingApi, CostExplorer};
use crate::core::config::ReportConfig;
use crate::core::error::ReportError;
use crate::core::formatter::build_report;
use crate::core::models::report::{Period, Report};
use crate::core::notify::ReportChannel;

/// Fetch, derive and format one report variant.
async fn build_stage(
    explorer: &CostExplorer<'_>,
    period: Period,
    include_credit: bool,
) -> Result<Report, ReportError> {
    let record = explorer.fetch(period, include_credit, true).await?;
    let total = CostExplorer::total_of(&record);
    let costs = CostExplorer::service_costs_of(&record)?;
    Ok(build_report(
        include_credit,
        total,
        &costs,
        &period.start_label(),
        &period.end_label(),
    ))
}

/// Produce the post-credit report, then the pre-credit one.
///
/// Each report is printed (text mode) and, when posting is enabled, sent to
/// `channel` as soon as it is built. The first failure aborts the run, so a
/// failed post-credit stage means no pre-credit query is made.
pub async fn run(
    config: &ReportConfig,
    today: NaiveDate,
    billing: &dyn BillingApi,
    channel: &dyn ReportChannel,
    opts: &OutputOptions,
) -> Result<Vec<Report>, ReportError> {
    config.validate()?;

    let period = Period::month_to_date(today);
    info!(start = %period.start, end = %period.end, "Resolved reporting period");

    let explorer = CostExplorer::new(billing);
    let mut reports = Vec::with_capacity(2);

    for include_credit in [true, false] {
        let report = build_stage(&explorer, period, include_credit).await?;

        if opts.format == OutputFormat::Text {
            println!("{}", renderer::render_report(&report, opts.use_color));
        }
        if config.use_teams_post {
            info!(channel = channel.name(), include_credit, "Delivering report");
            channel.send(&report).await?;
        }
        reports.push(report);
    }

    if opts.format == OutputFormat::Json {
        let json = if opts.pretty {
            serde_json::to_string_pretty(&reports)?
        } else {
            serde_json::to_string(&reports)?
        };
        println!("{}", json);
    }

    Ok(reports)
}
