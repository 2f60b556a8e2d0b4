//! Provider-related types.
//!
//! This module contains types related to relay providers:
//! - [`ProviderId`] - Enum of supported relay providers
//! - [`Provider`] - Runtime registry entry (priority, quota, enabled)
//! - [`ProviderCredentials`] - Secrets that enable a provider
//! - [`ProviderSettings`] - Per-provider configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Provider Id
// ============================================================================

/// Supported relay providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Brevo (formerly Sendinblue)
    Brevo,
    /// Twilio SendGrid
    SendGrid,
    /// Mailgun
    Mailgun,
}

impl ProviderId {
    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Brevo => "Brevo",
            Self::SendGrid => "SendGrid",
            Self::Mailgun => "Mailgun",
        }
    }

    /// Returns the stable storage/CLI name (lowercase, no spaces).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brevo => "brevo",
            Self::SendGrid => "sendgrid",
            Self::Mailgun => "mailgun",
        }
    }

    /// Returns all provider ids in default failover order.
    pub fn all() -> &'static [ProviderId] {
        &[Self::Brevo, Self::SendGrid, Self::Mailgun]
    }

    /// Default failover rank (ascending = tried first).
    pub fn default_priority(self) -> u32 {
        match self {
            Self::Brevo => 1,
            Self::SendGrid => 2,
            Self::Mailgun => 3,
        }
    }

    /// Default daily sending quota.
    pub fn default_daily_quota(self) -> u32 {
        match self {
            Self::Brevo => 300,
            Self::SendGrid | Self::Mailgun => 100,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}

// ============================================================================
// Provider
// ============================================================================

/// A provider as seen by the dispatcher.
///
/// Built once from configuration at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Stable identity.
    pub id: ProviderId,
    /// Failover rank (ascending = tried first).
    pub priority: u32,
    /// Daily sending quota, always > 0.
    pub daily_quota: u32,
    /// True iff the provider's credentials are configured.
    pub enabled: bool,
}

impl Provider {
    /// Creates a provider entry.
    pub fn new(id: ProviderId, priority: u32, daily_quota: u32, enabled: bool) -> Self {
        Self {
            id,
            priority,
            daily_quota,
            enabled,
        }
    }

    /// Creates an entry using the built-in priority and quota.
    pub fn with_defaults(id: ProviderId, enabled: bool) -> Self {
        Self::new(id, id.default_priority(), id.default_daily_quota(), enabled)
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }
}

// ============================================================================
// Credentials & Settings
// ============================================================================

/// Credentials for a relay provider.
///
/// Presence of the required fields is what enables a provider.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCredentials {
    /// API key or secret token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sending domain (Mailgun).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl ProviderCredentials {
    /// Creates credentials with only an API key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            domain: None,
        }
    }

    /// Sets the sending domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Returns the API key if it is present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    /// Returns the sending domain if it is present and non-blank.
    pub fn sending_domain(&self) -> Option<&str> {
        non_blank(self.domain.as_deref())
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Per-provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Daily quota override (defaults to the provider's built-in quota).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_quota: Option<u32>,
    /// Priority override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// API base URL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Credentials.
    pub credentials: ProviderCredentials,
}

impl ProviderSettings {
    /// Effective daily quota for the given provider.
    pub fn effective_quota(&self, id: ProviderId) -> u32 {
        self.daily_quota.unwrap_or_else(|| id.default_daily_quota())
    }

    /// Effective priority for the given provider.
    pub fn effective_priority(&self, id: ProviderId) -> u32 {
        self.priority.unwrap_or_else(|| id.default_priority())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_names() {
        assert_eq!(ProviderId::SendGrid.display_name(), "SendGrid");
        assert_eq!(ProviderId::SendGrid.as_str(), "sendgrid");
        assert_eq!(ProviderId::Mailgun.to_string(), "mailgun");
    }

    #[test]
    fn test_provider_id_from_str() {
        assert_eq!("BREVO".parse::<ProviderId>(), Ok(ProviderId::Brevo));
        assert_eq!(" mailgun ".parse::<ProviderId>(), Ok(ProviderId::Mailgun));
        assert!("postmark".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_default_order_and_quotas() {
        let priorities: Vec<u32> = ProviderId::all()
            .iter()
            .map(|id| id.default_priority())
            .collect();
        assert_eq!(priorities, vec![1, 2, 3]);
        assert_eq!(ProviderId::Brevo.default_daily_quota(), 300);
        assert_eq!(ProviderId::SendGrid.default_daily_quota(), 100);
        assert_eq!(ProviderId::Mailgun.default_daily_quota(), 100);
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let creds = ProviderCredentials::with_api_key("   ").domain("");
        assert!(creds.api_key().is_none());
        assert!(creds.sending_domain().is_none());

        let creds = ProviderCredentials::with_api_key("key-1").domain("mg.example.org");
        assert_eq!(creds.api_key(), Some("key-1"));
        assert_eq!(creds.sending_domain(), Some("mg.example.org"));
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds = ProviderCredentials::with_api_key("super-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_settings_effective_values() {
        let settings = ProviderSettings {
            daily_quota: Some(50),
            ..Default::default()
        };
        assert_eq!(settings.effective_quota(ProviderId::Brevo), 50);
        assert_eq!(settings.effective_priority(ProviderId::Brevo), 1);
        assert_eq!(
            ProviderSettings::default().effective_quota(ProviderId::Mailgun),
            100
        );
    }
}
