//! Provider registry for managing all provider descriptors.
//!
//! The registry provides static access to all provider configurations
//! and is where configured settings are turned into dispatch lanes.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use courier_core::{Provider, ProviderId, ProviderSettings};
use courier_relay::RelayLane;
use tracing::{debug, info};

use crate::brevo::brevo_descriptor;
use crate::descriptor::ProviderDescriptor;
use crate::mailgun::mailgun_descriptor;
use crate::sendgrid::sendgrid_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all provider descriptors.
static DESCRIPTORS: OnceLock<Vec<ProviderDescriptor>> = OnceLock::new();

/// Initializes all provider descriptors in default failover order.
fn init_descriptors() -> Vec<ProviderDescriptor> {
    vec![brevo_descriptor(), sendgrid_descriptor(), mailgun_descriptor()]
}

// ============================================================================
// Provider Registry
// ============================================================================

/// Global registry of all provider descriptors.
///
/// Initialized lazily on first access; read-only afterwards.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns all provider descriptors.
    pub fn all() -> &'static [ProviderDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a provider descriptor by id.
    pub fn get(id: ProviderId) -> Option<&'static ProviderDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Looks up a provider by its stable name (case-insensitive).
    pub fn get_by_name(name: &str) -> Option<&'static ProviderDescriptor> {
        name.parse::<ProviderId>().ok().and_then(Self::get)
    }

    /// Registry entries for the configured settings, in priority order.
    ///
    /// Providers absent from `settings` appear with their defaults and are
    /// disabled, since they have no credentials.
    pub fn providers(settings: &BTreeMap<ProviderId, ProviderSettings>) -> Vec<Provider> {
        let mut providers: Vec<Provider> = Self::all()
            .iter()
            .map(|d| d.provider(&settings_for(settings, d.id)))
            .collect();
        providers.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        providers
    }

    /// Dispatch lanes for the configured settings, in priority order.
    pub fn lanes(settings: &BTreeMap<ProviderId, ProviderSettings>) -> Vec<RelayLane> {
        let mut lanes: Vec<RelayLane> = Self::all()
            .iter()
            .map(|d| {
                let lane = d.lane(&settings_for(settings, d.id));
                debug!(
                    provider = %d.id,
                    priority = lane.provider.priority,
                    quota = lane.provider.daily_quota,
                    enabled = lane.is_enabled(),
                    "Built relay lane"
                );
                lane
            })
            .collect();
        lanes.sort_by(|a, b| {
            a.provider
                .priority
                .cmp(&b.provider.priority)
                .then(a.id().cmp(&b.id()))
        });

        let enabled = lanes.iter().filter(|l| l.is_enabled()).count();
        info!(lanes = lanes.len(), enabled, "Provider registry ready");
        lanes
    }
}

fn settings_for(
    settings: &BTreeMap<ProviderId, ProviderSettings>,
    id: ProviderId,
) -> ProviderSettings {
    settings.get(&id).cloned().unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::ProviderCredentials;

    fn configured(key: &str) -> ProviderSettings {
        ProviderSettings {
            credentials: ProviderCredentials::with_api_key(key),
            ..ProviderSettings::default()
        }
    }

    #[test]
    fn test_all_providers_registered() {
        let ids: Vec<ProviderId> = ProviderRegistry::all().iter().map(|d| d.id).collect();
        assert_eq!(ids, ProviderId::all());
    }

    #[test]
    fn test_get_by_name() {
        assert_eq!(
            ProviderRegistry::get_by_name("SendGrid").map(|d| d.id),
            Some(ProviderId::SendGrid)
        );
        assert!(ProviderRegistry::get_by_name("postmark").is_none());
    }

    #[test]
    fn test_providers_enabled_by_credentials() {
        let mut settings = BTreeMap::new();
        settings.insert(ProviderId::Brevo, configured("xkeysib"));
        settings.insert(ProviderId::Mailgun, configured("key-1"));

        let providers = ProviderRegistry::providers(&settings);
        let summary: Vec<(ProviderId, bool)> =
            providers.iter().map(|p| (p.id, p.enabled)).collect();
        assert_eq!(
            summary,
            vec![
                (ProviderId::Brevo, true),
                (ProviderId::SendGrid, false),
                (ProviderId::Mailgun, false),
            ]
        );
    }

    #[test]
    fn test_lanes_follow_priority_overrides() {
        let mut settings = BTreeMap::new();
        settings.insert(
            ProviderId::Mailgun,
            ProviderSettings {
                priority: Some(0),
                daily_quota: Some(25),
                credentials: ProviderCredentials::with_api_key("key-1").domain("mg.example.org"),
                ..ProviderSettings::default()
            },
        );

        let lanes = ProviderRegistry::lanes(&settings);
        let order: Vec<ProviderId> = lanes.iter().map(RelayLane::id).collect();
        assert_eq!(
            order,
            vec![ProviderId::Mailgun, ProviderId::Brevo, ProviderId::SendGrid]
        );
        assert!(lanes[0].is_enabled());
        assert_eq!(lanes[0].provider.daily_quota, 25);
        assert!(!lanes[1].is_enabled());
    }
}
