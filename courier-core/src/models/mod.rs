//! Domain models for Courier.
//!
//! This module contains the core data structures representing relay
//! providers, outgoing messages, quota accounting, the delivery log and the
//! read-only stats views built on top of them.
//!
//! ## Submodules
//!
//! - [`provider`] - Provider types (ProviderId, Provider, ProviderSettings)
//! - [`message`] - Message types (MessageType, Recipient, OutgoingMessage)
//! - [`quota`] - Quota accounting (QuotaCounter, AttemptOutcome)
//! - [`delivery`] - Delivery log (DeliveryLogEntry, DeliveryStatus)
//! - [`health`] - Derived health (HealthStatus, ServiceHealth)
//! - [`account`] - Collaborator data for replays (Account, ResetToken)
//! - [`stats`] - Aggregated views (TodayStats, RangeStats, ChartDay)

mod account;
mod delivery;
mod health;
mod message;
mod provider;
mod quota;
mod stats;

// Re-export everything at the models level
pub use account::{Account, RenderContext, ResetToken};
pub use delivery::{DeliveryLogEntry, DeliveryStatus};
pub use health::{HealthStatus, ServiceHealth};
pub use message::{MessagePayload, MessageType, OutgoingMessage, Recipient};
pub use provider::{Provider, ProviderCredentials, ProviderId, ProviderSettings};
pub use quota::{AttemptOutcome, QuotaCounter};
pub use stats::{
    ChartDay, ChartPoint, HourlyHistogram, ProviderDayStats, RangeStats, RangeTotals, TodayStats,
    TotalStats,
};
