//! Mailgun provider descriptor.

use std::sync::Arc;

use courier_core::{ProviderId, ProviderSettings};
use courier_relay::RelayTransport;

use crate::descriptor::{CredentialField, EndpointConfig, ProviderDescriptor, ProviderMetadata};

use super::transport::{MAILGUN_API_BASE, MailgunTransport};

/// Creates the Mailgun provider descriptor.
pub fn mailgun_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::builder(ProviderId::Mailgun, build_transport)
        .metadata(ProviderMetadata {
            display_name: "Mailgun",
            dashboard_url: "https://app.mailgun.com/settings/api_security",
        })
        .endpoint(EndpointConfig {
            default_base_url: MAILGUN_API_BASE,
        })
        .requires(&[CredentialField::ApiKey, CredentialField::Domain])
        .build()
}

fn build_transport(settings: &ProviderSettings) -> Arc<dyn RelayTransport> {
    Arc::new(MailgunTransport::from_settings(settings))
}
