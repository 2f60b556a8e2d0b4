//! Replay command - re-drive a failed delivery log entry.

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::runtime::Runtime;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the replay command.
#[derive(Args)]
pub struct ReplayArgs {
    /// Delivery log entry id (must be a failed entry).
    pub log_id: i64,
}

/// Runs the replay command.
///
/// Validation failures (unknown id, entry not failed, recipient gone, no
/// reset token) are errors; a replay that fails on every provider exits
/// with [`ExitCode::DeliveryFailed`].
pub async fn run(args: &ReplayArgs, cli: &Cli) -> Result<ExitCode> {
    let runtime = Runtime::load(cli).await?;
    let replayer = runtime.replayer().await?;

    info!(log_id = args.log_id, "Replaying delivery");
    let result = replayer.replay(args.log_id).await?;

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Replay of #{}", args.log_id);
                println!("{}", TextFormatter::new(!cli.no_color).format_dispatch(&result));
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_dispatch(&result)?);
        }
    }

    Ok(if result.is_sent() {
        ExitCode::Success
    } else {
        ExitCode::DeliveryFailed
    })
}
