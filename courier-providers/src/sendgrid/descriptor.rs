//! SendGrid provider descriptor.

use std::sync::Arc;

use courier_core::{ProviderId, ProviderSettings};
use courier_relay::RelayTransport;

use crate::descriptor::{CredentialField, EndpointConfig, ProviderDescriptor, ProviderMetadata};

use super::transport::{SENDGRID_API_BASE, SendGridTransport};

/// Creates the SendGrid provider descriptor.
pub fn sendgrid_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::builder(ProviderId::SendGrid, build_transport)
        .metadata(ProviderMetadata {
            display_name: "SendGrid",
            dashboard_url: "https://app.sendgrid.com/settings/api_keys",
        })
        .endpoint(EndpointConfig {
            default_base_url: SENDGRID_API_BASE,
        })
        .requires(&[CredentialField::ApiKey])
        .build()
}

fn build_transport(settings: &ProviderSettings) -> Arc<dyn RelayTransport> {
    Arc::new(SendGridTransport::from_settings(settings))
}
