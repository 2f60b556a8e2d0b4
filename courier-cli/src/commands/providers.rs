//! Providers command - list relay providers.

use anyhow::Result;
use courier_providers::ProviderRegistry;
use courier_store::Config;
use tracing::info;

use crate::output::{JsonFormatter, ProviderRow, TextFormatter};
use crate::runtime::load_config;
use crate::{Cli, ExitCode, OutputFormat};

/// Builds one row per provider, in failover order.
pub fn rows(config: &Config) -> Vec<ProviderRow> {
    let mut rows: Vec<ProviderRow> = ProviderRegistry::all()
        .iter()
        .map(|descriptor| {
            let settings = config.provider(descriptor.id);
            ProviderRow {
                descriptor,
                provider: descriptor.provider(&settings),
                base_url: descriptor.base_url(&settings).to_string(),
                missing: descriptor
                    .missing_credentials(&settings.credentials)
                    .into_iter()
                    .map(|field| field.key().to_string())
                    .collect(),
            }
        })
        .collect();
    rows.sort_by_key(|row| (row.provider.priority, row.provider.id));
    rows
}

/// Runs the providers command.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    info!("Listing providers");

    let config = load_config(cli).await?;
    let rows = rows(&config);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_providers_header());
            println!("{}", "─".repeat(60));
            for row in &rows {
                println!("{}", formatter.format_provider_line(row));
            }

            println!();
            println!(
                "Total: {} providers ({} enabled)",
                rows.len(),
                rows.iter().filter(|r| r.provider.enabled).count()
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_providers(&rows)?);
        }
    }

    Ok(ExitCode::Success)
}
