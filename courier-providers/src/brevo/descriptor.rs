//! Brevo provider descriptor.

use std::sync::Arc;

use courier_core::{ProviderId, ProviderSettings};
use courier_relay::RelayTransport;

use crate::descriptor::{CredentialField, EndpointConfig, ProviderDescriptor, ProviderMetadata};

use super::transport::{BREVO_API_BASE, BrevoTransport};

/// Creates the Brevo provider descriptor.
pub fn brevo_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::builder(ProviderId::Brevo, build_transport)
        .metadata(ProviderMetadata {
            display_name: "Brevo",
            dashboard_url: "https://app.brevo.com/settings/keys/api",
        })
        .endpoint(EndpointConfig {
            default_base_url: BREVO_API_BASE,
        })
        .requires(&[CredentialField::ApiKey])
        .build()
}

fn build_transport(settings: &ProviderSettings) -> Arc<dyn RelayTransport> {
    Arc::new(BrevoTransport::from_settings(settings))
}
