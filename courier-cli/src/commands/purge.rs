//! Purge command - retention sweep of the delivery log.

use anyhow::Result;
use clap::Args;

use crate::output::{JsonFormatter, TextFormatter};
use crate::runtime::Runtime;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the purge command.
#[derive(Args)]
pub struct PurgeArgs {
    /// Delete entries created more than this many days ago.
    #[arg(long, value_name = "DAYS")]
    pub older_than: u32,
}

/// Runs the purge command.
pub async fn run(args: &PurgeArgs, cli: &Cli) -> Result<ExitCode> {
    let runtime = Runtime::load(cli).await?;
    let deleted = runtime.sweeper()?.purge(args.older_than).await?;

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!(
                    "{}",
                    TextFormatter::new(!cli.no_color).format_purge(deleted, args.older_than)
                );
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                JsonFormatter::new(cli.pretty).format_purge(deleted, args.older_than)?
            );
        }
    }

    Ok(ExitCode::Success)
}
