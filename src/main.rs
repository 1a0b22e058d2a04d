mod cli;
mod core;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::billing::aws::AwsCostExplorer;
use crate::core::config::ReportConfig;
use crate::core::notify::TeamsChannel;

#[derive(Parser)]
#[command(
    name = "aws-cost-report",
    about = "Month-to-date AWS cost report, before and after credits",
    version
)]
struct Cli {
    /// Print both reports as JSON instead of text
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Post both reports to Teams (overrides USE_TEAMS_POST)
    #[arg(long, conflicts_with = "no_teams")]
    teams: bool,

    /// Never post to Teams (overrides USE_TEAMS_POST)
    #[arg(long)]
    no_teams: bool,

    /// Teams incoming webhook URL (overrides TEAMS_WEBHOOK_URL)
    #[arg(long)]
    webhook_url: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, mut config: ReportConfig) -> ReportConfig {
        if self.teams {
            config.use_teams_post = true;
        }
        if self.no_teams {
            config.use_teams_post = false;
        }
        if let Some(url) = self.webhook_url.as_ref().filter(|u| !u.trim().is_empty()) {
            config.teams_webhook_url = Some(url.clone());
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config =
        ReportConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = cli.apply_overrides(config);

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            cli::output::OutputFormat::Text
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
    };

    let billing = AwsCostExplorer::from_env().await;
    let channel = TeamsChannel::new(config.teams_webhook_url.clone());
    let today = chrono::Local::now().date_naive();

    cli::report_cmd::run(&config, today, &billing, &channel, &output_opts).await?;

    Ok(())
}
