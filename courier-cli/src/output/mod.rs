//! Output formatting for CLI.

mod json;
mod text;

use courier_core::Provider;
use courier_providers::ProviderDescriptor;

pub use json::JsonFormatter;
pub use text::TextFormatter;
#[cfg(test)]
mod tests;

/// One row of `courier providers`: the descriptor plus its configured state.
pub struct ProviderRow {
    /// Static provider info.
    pub descriptor: &'static ProviderDescriptor,
    /// Registry entry derived from configuration.
    pub provider: Provider,
    /// Effective API base URL.
    pub base_url: String,
    /// Credential keys that are not configured.
    pub missing: Vec<String>,
}
