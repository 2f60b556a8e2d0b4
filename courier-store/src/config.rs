//! Configuration management.
//!
//! One JSON file, loaded once at startup into an immutable [`Config`].
//! Provider credentials may be overlaid from the environment so secrets do
//! not have to live in the file.

use courier_core::{ProviderCredentials, ProviderId, ProviderSettings, Recipient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{
    default_accounts_path, default_config_path, default_database_path, load_json_or_default,
    save_json,
};

/// Environment variable overriding the Brevo API key.
pub const ENV_BREVO_API_KEY: &str = "COURIER_BREVO_API_KEY";
/// Environment variable overriding the SendGrid API key.
pub const ENV_SENDGRID_API_KEY: &str = "COURIER_SENDGRID_API_KEY";
/// Environment variable overriding the Mailgun API key.
pub const ENV_MAILGUN_API_KEY: &str = "COURIER_MAILGUN_API_KEY";
/// Environment variable overriding the Mailgun sending domain.
pub const ENV_MAILGUN_DOMAIN: &str = "COURIER_MAILGUN_DOMAIN";

// ============================================================================
// Config Types
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path (defaults to the platform data dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Accounts file used for replays (defaults to the config dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts_path: Option<PathBuf>,
    /// `From` identity.
    pub sender: SenderConfig,
    /// Relay call settings.
    pub relay: RelayConfig,
    /// Accepted purge horizons.
    pub retention: RetentionConfig,
    /// Links embedded in replayed messages.
    pub links: LinkConfig,
    /// Per-provider settings.
    pub providers: BTreeMap<ProviderId, ProviderSettings>,
}

/// Sender identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Sender mailbox.
    pub email: String,
    /// Sender display name.
    pub name: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            email: "no-reply@example.org".to_string(),
            name: "Courier".to_string(),
        }
    }
}

/// Relay call settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bound on a single provider call, in seconds.
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// Accepted purge horizons, in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Shortest accepted horizon.
    pub min_days: u32,
    /// Longest accepted horizon.
    pub max_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            min_days: 7,
            max_days: 90,
        }
    }
}

/// Link templates for rendered messages.
///
/// `{account}`, `{email}` and `{token}` are substituted when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Address verification link.
    pub verify_url: String,
    /// Password reset link.
    pub reset_url: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            verify_url: "https://example.org/verify?account={account}".to_string(),
            reset_url: "https://example.org/reset?token={token}".to_string(),
        }
    }
}

// ============================================================================
// Config Impl
// ============================================================================

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from a specific path, overlays the environment
    /// and validates it. A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        let mut config: Config = load_json_or_default(path).await?;
        debug!(path = %path.display(), "Loaded configuration file");

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;

        info!(path = %path.display(), "Configuration ready");
        Ok(config)
    }

    /// Saves configuration to a specific path (mode 0600).
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Overlays credentials from the environment via `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overlays = [
            (ProviderId::Brevo, ENV_BREVO_API_KEY, false),
            (ProviderId::SendGrid, ENV_SENDGRID_API_KEY, false),
            (ProviderId::Mailgun, ENV_MAILGUN_API_KEY, false),
            (ProviderId::Mailgun, ENV_MAILGUN_DOMAIN, true),
        ];

        for (id, var, is_domain) in overlays {
            let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            debug!(provider = %id, var, "Credential overlaid from environment");
            let creds = &mut self.providers.entry(id).or_default().credentials;
            if is_domain {
                creds.domain = Some(value);
            } else {
                creds.api_key = Some(value);
            }
        }
    }

    /// Rejects settings that would make the dispatcher misbehave.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (id, settings) in &self.providers {
            if settings.daily_quota == Some(0) {
                return Err(StoreError::Config(format!(
                    "providers.{id}.daily_quota must be greater than zero"
                )));
            }
        }
        if self.relay.timeout_secs == 0 {
            return Err(StoreError::Config(
                "relay.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.retention.min_days == 0 || self.retention.min_days > self.retention.max_days {
            return Err(StoreError::Config(format!(
                "retention bounds {}..={} are invalid",
                self.retention.min_days, self.retention.max_days
            )));
        }
        Recipient::parse(&self.sender.email).map_err(|_| {
            StoreError::Config(format!("sender.email {:?} is invalid", self.sender.email))
        })?;
        Ok(())
    }

    /// Settings for one provider (defaults when not configured).
    pub fn provider(&self, id: ProviderId) -> ProviderSettings {
        self.providers.get(&id).cloned().unwrap_or_default()
    }

    /// Credentials for one provider.
    pub fn credentials(&self, id: ProviderId) -> ProviderCredentials {
        self.provider(id).credentials
    }

    /// Effective database path.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Effective accounts file path.
    pub fn accounts_path(&self) -> PathBuf {
        self.accounts_path
            .clone()
            .unwrap_or_else(default_accounts_path)
    }

    /// A starter config with an entry for every provider, used by
    /// `config init`.
    pub fn template() -> Self {
        let providers = ProviderId::all()
            .iter()
            .map(|id| {
                (
                    *id,
                    ProviderSettings {
                        daily_quota: Some(id.default_daily_quota()),
                        priority: Some(id.default_priority()),
                        ..ProviderSettings::default()
                    },
                )
            })
            .collect();
        Self {
            providers,
            ..Self::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
