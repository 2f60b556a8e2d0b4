//! Provider descriptor system.
//!
//! A descriptor contains all the static configuration for a provider:
//! - Metadata (display name, dashboard URL)
//! - Endpoint (default API base)
//! - Which credentials enable it
//! - How to build its transport from settings

use std::fmt;
use std::sync::Arc;

use courier_core::{Provider, ProviderCredentials, ProviderId, ProviderSettings};
use courier_relay::{RelayLane, RelayTransport};

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Complete descriptor for a provider.
///
/// Descriptors never change at runtime; configuration is applied when a
/// [`Provider`] or [`RelayLane`] is derived from one.
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub id: ProviderId,
    /// Display metadata.
    pub metadata: ProviderMetadata,
    /// API endpoint defaults.
    pub endpoint: EndpointConfig,
    /// Credentials that must all be present for the provider to be enabled.
    pub required_credentials: &'static [CredentialField],
    /// Builds the transport for the given settings.
    pub build_transport: fn(&ProviderSettings) -> Arc<dyn RelayTransport>,
}

impl ProviderDescriptor {
    /// Creates a new descriptor builder.
    pub fn builder(
        id: ProviderId,
        build_transport: fn(&ProviderSettings) -> Arc<dyn RelayTransport>,
    ) -> ProviderDescriptorBuilder {
        ProviderDescriptorBuilder::new(id, build_transport)
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.metadata.display_name
    }

    /// Returns the credential fields that are missing or blank.
    pub fn missing_credentials(&self, credentials: &ProviderCredentials) -> Vec<CredentialField> {
        self.required_credentials
            .iter()
            .copied()
            .filter(|field| !field.is_present(credentials))
            .collect()
    }

    /// True iff every required credential is present.
    pub fn is_configured(&self, credentials: &ProviderCredentials) -> bool {
        self.missing_credentials(credentials).is_empty()
    }

    /// Effective API base URL.
    pub fn base_url<'a>(&self, settings: &'a ProviderSettings) -> &'a str {
        resolve_base_url(settings, self.endpoint.default_base_url)
    }

    /// Registry entry derived from the given settings.
    pub fn provider(&self, settings: &ProviderSettings) -> Provider {
        Provider::new(
            self.id,
            settings.effective_priority(self.id),
            settings.effective_quota(self.id),
            self.is_configured(&settings.credentials),
        )
    }

    /// Builds a dispatch lane: registry entry plus transport.
    pub fn lane(&self, settings: &ProviderSettings) -> RelayLane {
        RelayLane::new(self.provider(settings), (self.build_transport)(settings))
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("endpoint", &self.endpoint)
            .field("required_credentials", &self.required_credentials)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Human-facing information about a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Display name.
    pub display_name: &'static str,
    /// Where operators manage keys and quotas.
    pub dashboard_url: &'static str,
}

impl ProviderMetadata {
    /// Metadata with only a display name.
    pub fn for_provider(id: ProviderId) -> Self {
        Self {
            display_name: id.display_name(),
            dashboard_url: "",
        }
    }
}

// ============================================================================
// Endpoint Config
// ============================================================================

/// API endpoint defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Base URL used when settings do not override it.
    pub default_base_url: &'static str,
}

/// Settings override when non-blank, otherwise `default`.
pub(crate) fn resolve_base_url<'a>(settings: &'a ProviderSettings, default: &'static str) -> &'a str {
    settings
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(default)
}

// ============================================================================
// Credentials
// ============================================================================

/// A credential a provider needs before it is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    /// API key or token.
    ApiKey,
    /// Sending domain.
    Domain,
}

impl CredentialField {
    /// Config key under `providers.<id>.credentials`.
    pub fn key(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::Domain => "domain",
        }
    }

    /// True if the field is present and non-blank.
    pub fn is_present(self, credentials: &ProviderCredentials) -> bool {
        match self {
            Self::ApiKey => credentials.api_key().is_some(),
            Self::Domain => credentials.sending_domain().is_some(),
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ProviderDescriptor`].
pub struct ProviderDescriptorBuilder {
    id: ProviderId,
    metadata: Option<ProviderMetadata>,
    endpoint: EndpointConfig,
    required_credentials: &'static [CredentialField],
    build_transport: fn(&ProviderSettings) -> Arc<dyn RelayTransport>,
}

impl ProviderDescriptorBuilder {
    /// Creates a new builder for the given provider.
    pub fn new(
        id: ProviderId,
        build_transport: fn(&ProviderSettings) -> Arc<dyn RelayTransport>,
    ) -> Self {
        Self {
            id,
            metadata: None,
            endpoint: EndpointConfig {
                default_base_url: "",
            },
            required_credentials: &[CredentialField::ApiKey],
            build_transport,
        }
    }

    /// Sets the metadata.
    pub fn metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the endpoint defaults.
    pub fn endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the credentials that enable the provider.
    pub fn requires(mut self, fields: &'static [CredentialField]) -> Self {
        self.required_credentials = fields;
        self
    }

    /// Builds the descriptor.
    pub fn build(self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: self.id,
            metadata: self
                .metadata
                .unwrap_or_else(|| ProviderMetadata::for_provider(self.id)),
            endpoint: self.endpoint,
            required_credentials: self.required_credentials,
            build_transport: self.build_transport,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
