// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Courier CLI - operate the transactional message dispatcher.
//!
//! # Examples
//!
//! ```bash
//! # Send a verification message
//! courier send --type verification --to member@example.org \
//!     --subject "Confirm your address" --text "https://example.org/v/1"
//!
//! # Re-drive a failed delivery
//! courier replay 42
//!
//! # Today's usage per provider
//! courier stats today
//!
//! # Last 50 deliveries as JSON
//! courier stats recent --limit 50 --format json --pretty
//!
//! # Delete log entries older than 30 days
//! courier purge --older-than 30
//!
//! # List providers
//! courier providers
//! ```

mod commands;
mod output;
mod render;
mod runtime;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, providers, purge, replay, send, stats};

// ============================================================================
// CLI Definition
// ============================================================================

/// Courier CLI - transactional message dispatcher.
#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Transactional message dispatcher with relay failover")]
#[command(long_about = r#"
Courier delivers transactional messages through third-party relays, each
with its own daily quota, failing over in priority order.

Supported providers:
  • Brevo (brevo)
  • SendGrid (sendgrid)
  • Mailgun (mailgun)

Examples:
  courier send --type verification --to a@example.org --subject Hi --text Hello
  courier stats health           # Provider health for today
  courier stats chart            # Last 7 days per provider
  courier replay 42              # Re-drive a failed delivery
  courier purge --older-than 30  # Retention sweep
"#)]
#[command(version)]
#[command(author = "Courier Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config dir).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch one message with failover.
    Send(send::SendArgs),

    /// Re-drive a failed delivery log entry.
    Replay(replay::ReplayArgs),

    /// Show usage statistics and provider health.
    #[command(visible_alias = "s")]
    Stats(stats::StatsArgs),

    /// Delete delivery log entries older than a horizon.
    Purge(purge::PurgeArgs),

    /// List relay providers with priority, quota and status.
    #[command(visible_alias = "p")]
    Providers,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Every provider was exhausted or failing.
    DeliveryFailed = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("courier=debug,info")
    } else {
        EnvFilter::new("courier=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Send(args) => send::run(args, &cli).await,
        Commands::Replay(args) => replay::run(args, &cli).await,
        Commands::Stats(args) => stats::run(args, &cli).await,
        Commands::Purge(args) => purge::run(args, &cli).await,
        Commands::Providers => providers::run(&cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }
}
