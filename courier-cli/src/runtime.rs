//! Wiring from configuration to the dispatcher and its read models.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use courier_core::{Clock, SystemClock};
use courier_providers::ProviderRegistry;
use courier_relay::{
    Dispatcher, RelayContext, Replayer, RetentionBounds, RetentionSweeper, SenderIdentity,
};
use courier_store::{Config, JsonAccountDirectory, SqliteStore, StatsAggregator};
use tracing::debug;

use crate::Cli;
use crate::render::LinkRenderer;

/// Everything a command needs, built once per invocation.
pub struct Runtime {
    /// Loaded configuration.
    pub config: Config,
    /// Delivery database.
    pub store: SqliteStore,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

impl Runtime {
    /// Loads the configuration and opens the database.
    pub async fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli).await?;
        let db_path = config.database_path();
        debug!(path = %db_path.display(), "Opening delivery database");

        let store = tokio::task::spawn_blocking(move || SqliteStore::open(&db_path))
            .await
            .context("database open task failed")??;

        Ok(Self {
            config,
            store,
            clock: Arc::new(SystemClock),
        })
    }

    /// Relay context from the sender and timeout settings.
    pub fn relay_context(&self) -> RelayContext {
        RelayContext::builder()
            .timeout(Duration::from_secs(self.config.relay.timeout_secs))
            .sender(SenderIdentity::new(
                self.config.sender.email.clone(),
                self.config.sender.name.clone(),
            ))
            .build()
    }

    /// Dispatcher over every configured provider lane.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(
            ProviderRegistry::lanes(&self.config.providers),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::clone(&self.clock),
            self.relay_context(),
        ))
    }

    /// Replay controller backed by the accounts file.
    pub async fn replayer(&self) -> Result<Replayer> {
        let accounts_path = self.config.accounts_path();
        let directory = JsonAccountDirectory::load(&accounts_path)
            .await
            .with_context(|| format!("loading accounts from {}", accounts_path.display()))?;

        Ok(Replayer::new(
            self.dispatcher(),
            Arc::new(self.store.clone()),
            Arc::new(directory),
            Arc::new(LinkRenderer::new(self.config.links.clone())),
        ))
    }

    /// Stats views over the configured providers.
    pub fn stats(&self) -> StatsAggregator {
        StatsAggregator::new(
            Arc::new(self.store.clone()),
            ProviderRegistry::providers(&self.config.providers),
            Arc::clone(&self.clock),
        )
    }

    /// Retention sweeper with the configured bounds.
    pub fn sweeper(&self) -> Result<RetentionSweeper> {
        let bounds = RetentionBounds::new(
            self.config.retention.min_days,
            self.config.retention.max_days,
        )?;
        Ok(RetentionSweeper::new(
            Arc::new(self.store.clone()),
            Arc::clone(&self.clock),
            bounds,
        ))
    }
}

/// Loads the configuration from `--config` or the default path.
pub async fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    Config::load_from(&path)
        .await
        .with_context(|| format!("loading configuration from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Commands, OutputFormat};
    use courier_core::{DeliveryStatus, MessagePayload, MessageType, OutgoingMessage, Recipient};

    fn cli_for(path: std::path::PathBuf) -> Cli {
        Cli {
            command: Commands::Providers,
            config: Some(path),
            format: OutputFormat::Text,
            pretty: false,
            verbose: false,
            no_color: true,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_send_is_logged_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let mut config = Config::template();
        config.database_path = Some(dir.path().join("courier.db"));
        config.save_to(&config_path).await.unwrap();

        let runtime = Runtime::load(&cli_for(config_path)).await.unwrap();
        let message = OutgoingMessage::new(
            MessageType::Verification,
            Recipient::parse("member@example.org").unwrap(),
            MessagePayload::new("Confirm").with_text("https://example.org/v/1"),
        );

        let result = runtime.dispatcher().dispatch(&message).await;
        assert_eq!(result.status, DeliveryStatus::Failed);
        assert_eq!(result.provider, None);

        let recent = runtime.stats().recent(None).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(Some(recent[0].id), result.log_id);
        assert!(dir.path().join("courier.db").exists());
    }

    #[tokio::test]
    async fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&cli_for(dir.path().join("absent.json")))
            .await
            .unwrap();
        assert_eq!(config.sender, Config::default().sender);
        assert!(
            RetentionBounds::new(config.retention.min_days, config.retention.max_days).is_ok()
        );
    }
}
