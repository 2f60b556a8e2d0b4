// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Courier` Core
//!
//! Core types, models, and traits for the `Courier` message dispatcher.
//!
//! This crate provides the foundational abstractions used across all other
//! `Courier` crates, including:
//!
//! - Domain models (providers, messages, quota counters, delivery log)
//! - Error types
//! - Storage and collaborator trait definitions
//! - A clock abstraction so calendar days can be pinned in tests
//!
//! ## Key Types
//!
//! ### Provider Types
//! - [`ProviderId`] - Enum of all supported relay providers
//! - [`Provider`] - Runtime provider entry (priority, quota, enabled)
//! - [`ProviderSettings`] - Configured quota, credentials and endpoint
//!
//! ### Message Types
//! - [`MessageType`] - Verification, password reset, or caller-defined
//! - [`Recipient`] - Validated destination address
//! - [`OutgoingMessage`] - Message handed to the dispatcher
//!
//! ### Accounting
//! - [`QuotaCounter`] - Per-provider, per-day counters
//! - [`DeliveryLogEntry`] - Audit record for one dispatch
//! - [`HealthStatus`] - Derived per-provider usage classification
//!
//! ### Stats Views
//! - [`TodayStats`], [`RangeStats`], [`ChartDay`], [`ServiceHealth`]

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{CoreError, ValidationError};

// Re-export all model types
pub use models::{
    // Accounts
    Account,
    RenderContext,
    ResetToken,
    // Delivery
    DeliveryLogEntry,
    DeliveryStatus,
    // Health
    HealthStatus,
    ServiceHealth,
    // Messages
    MessagePayload,
    MessageType,
    OutgoingMessage,
    Recipient,
    // Provider types
    Provider,
    ProviderCredentials,
    ProviderId,
    ProviderSettings,
    // Quota
    AttemptOutcome,
    QuotaCounter,
    // Stats
    ChartDay,
    ChartPoint,
    HourlyHistogram,
    ProviderDayStats,
    RangeStats,
    RangeTotals,
    TodayStats,
    TotalStats,
};

// Re-export traits
pub use traits::{
    AccountDirectory, Clock, DeliveryLog, FixedClock, MessageRenderer, QuotaLedger,
    StatsReadModel, SystemClock,
};
