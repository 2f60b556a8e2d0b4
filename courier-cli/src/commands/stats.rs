//! Stats command - usage views over the delivery log and quota ledger.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::output::{JsonFormatter, TextFormatter};
use crate::runtime::Runtime;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub view: StatsView,
}

/// Stats views.
#[derive(Subcommand)]
pub enum StatsView {
    /// Per-provider usage for the current UTC day.
    Today,

    /// Totals for the last 7 days, today included.
    Week,

    /// Totals since the 1st of the current month.
    Month,

    /// Totals over an inclusive date range.
    Range {
        /// First day (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,
        /// Last day (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,
    },

    /// Seven-day series per provider.
    Chart,

    /// Most recent delivery log entries.
    Recent {
        /// Number of entries (default 20, at most 500).
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Provider health for today.
    Health,
}

/// Runs the stats command.
pub async fn run(args: &StatsArgs, cli: &Cli) -> Result<ExitCode> {
    let runtime = Runtime::load(cli).await?;
    let stats = runtime.stats();
    let text = TextFormatter::new(!cli.no_color);
    let json = JsonFormatter::new(cli.pretty);
    let as_json = cli.format == OutputFormat::Json;

    let output = match &args.view {
        StatsView::Today => {
            let today = stats.today().await?;
            if as_json { json.format(&today)? } else { text.format_today(&today) }
        }
        StatsView::Week => {
            let week = stats.week().await?;
            if as_json { json.format(&week)? } else { text.format_range("Last 7 days", &week) }
        }
        StatsView::Month => {
            let month = stats.month().await?;
            if as_json { json.format(&month)? } else { text.format_range("This month", &month) }
        }
        StatsView::Range { from, to } => {
            if from > to {
                anyhow::bail!("--from {from} is after --to {to}");
            }
            let range = stats.range(*from, *to).await?;
            if as_json { json.format(&range)? } else { text.format_range("Range", &range) }
        }
        StatsView::Chart => {
            let chart = stats.chart().await?;
            if as_json { json.format(&chart)? } else { text.format_chart(&chart) }
        }
        StatsView::Recent { limit } => {
            let recent = stats.recent(*limit).await?;
            if as_json { json.format(&recent)? } else { text.format_recent(&recent) }
        }
        StatsView::Health => {
            let health = stats.health().await?;
            if as_json { json.format(&health)? } else { text.format_health(&health) }
        }
    };

    println!("{output}");
    Ok(ExitCode::Success)
}
