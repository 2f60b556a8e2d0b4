//! Config command - inspect and initialise configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use courier_store::Config;
use tracing::info;

use crate::output::JsonFormatter;
use crate::runtime::load_config;
use crate::{Cli, ExitCode, OutputFormat};

const REDACTED: &str = "********";

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets redacted).
    Show,

    /// Show configuration and data paths.
    Path,

    /// Write a starter configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli).await,
        ConfigAction::Init { force } => init_config(*force, cli).await,
    }
}

/// Returns a copy of `config` with every API key masked.
pub fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    for settings in config.providers.values_mut() {
        if settings.credentials.api_key.is_some() {
            settings.credentials.api_key = Some(REDACTED.to_string());
        }
    }
    config
}

fn config_path(cli: &Cli) -> std::path::PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

async fn show_config(cli: &Cli) -> Result<ExitCode> {
    let config = redacted(&load_config(cli).await?);

    match cli.format {
        OutputFormat::Text => {
            println!("Courier Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!(
                "Sender:     {} <{}>",
                config.sender.name, config.sender.email
            );
            println!("Timeout:    {}s", config.relay.timeout_secs);
            println!(
                "Retention:  {}..={} days",
                config.retention.min_days, config.retention.max_days
            );
            println!("Verify URL: {}", config.links.verify_url);
            println!("Reset URL:  {}", config.links.reset_url);
            println!();
            println!("Providers:");
            for (id, settings) in &config.providers {
                println!(
                    "  • {:<10} priority {:<3} quota {:<6} key {}",
                    id.display_name(),
                    settings.effective_priority(*id),
                    settings.effective_quota(*id),
                    settings.credentials.api_key.as_deref().unwrap_or("(unset)")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&config)?);
        }
    }

    Ok(ExitCode::Success)
}

async fn show_paths(cli: &Cli) -> Result<ExitCode> {
    let path = config_path(cli);
    let config = load_config(cli).await?;
    let database = config.database_path();
    let accounts = config.accounts_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file:   {}", path.display());
            println!("Database:      {}", database.display());
            println!("Accounts file: {}", accounts.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configFile": path.display().to_string(),
                "database": database.display().to_string(),
                "accountsFile": accounts.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(ExitCode::Success)
}

async fn init_config(force: bool, cli: &Cli) -> Result<ExitCode> {
    let path = config_path(cli);

    if !force && tokio::fs::try_exists(&path).await.unwrap_or(false) {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::template()
        .save_to(&path)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), "Configuration initialised");
    if !cli.quiet {
        println!("Wrote {}", path.display());
    }

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{ProviderCredentials, ProviderId, ProviderSettings};

    #[test]
    fn test_redacted_masks_keys_only() {
        let mut config = Config::template();
        config.providers.insert(
            ProviderId::Mailgun,
            ProviderSettings {
                credentials: ProviderCredentials::with_api_key("key-secret")
                    .domain("mg.example.org"),
                ..ProviderSettings::default()
            },
        );

        let shown = redacted(&config);
        let mailgun = &shown.providers[&ProviderId::Mailgun].credentials;
        assert_eq!(mailgun.api_key.as_deref(), Some(REDACTED));
        assert_eq!(mailgun.domain.as_deref(), Some("mg.example.org"));
        assert!(shown.providers[&ProviderId::Brevo].credentials.api_key.is_none());

        let json = serde_json::to_string(&shown).unwrap();
        assert!(!json.contains("key-secret"));
    }
}
