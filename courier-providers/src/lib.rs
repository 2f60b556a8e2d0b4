// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Courier Providers
//!
//! Concrete relay providers for Courier.
//!
//! Each provider module includes:
//!
//! - **Descriptor**: Static configuration (metadata, endpoint, credentials)
//! - **API**: Wire payloads for the relay's send endpoint
//! - **Transport**: [`courier_relay::RelayTransport`] implementation
//!
//! ## Supported Providers
//!
//! | Provider | Priority | Daily quota | Auth | Needs |
//! |----------|----------|-------------|------|-------|
//! | Brevo    | 1 | 300 | `api-key` header | `api_key` |
//! | SendGrid | 2 | 100 | Bearer token | `api_key` |
//! | Mailgun  | 3 | 100 | Basic auth | `api_key`, `domain` |
//!
//! ## Usage
//!
//! ```ignore
//! use courier_providers::ProviderRegistry;
//! use courier_relay::{Dispatcher, RelayContext};
//!
//! let lanes = ProviderRegistry::lanes(&config.providers);
//! let dispatcher = Dispatcher::new(lanes, ledger, log, clock, RelayContext::new());
//! ```

pub mod descriptor;
pub mod registry;

// Provider modules (by default priority)
pub mod brevo;
pub mod sendgrid;
pub mod mailgun;

// Re-export key types
pub use descriptor::{
    CredentialField, EndpointConfig, ProviderDescriptor, ProviderDescriptorBuilder,
    ProviderMetadata,
};
pub use registry::ProviderRegistry;

// Re-export provider descriptors
pub use brevo::brevo_descriptor;
pub use mailgun::mailgun_descriptor;
pub use sendgrid::sendgrid_descriptor;

// Re-export transports
pub use brevo::BrevoTransport;
pub use mailgun::MailgunTransport;
pub use sendgrid::SendGridTransport;
