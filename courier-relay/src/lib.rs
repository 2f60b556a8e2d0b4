// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Courier Relay
//!
//! Relay transports and the dispatch hot path for Courier.
//!
//! ## Host APIs
//!
//! - [`host::http`] - HTTP client with tracing, used by every relay API
//!
//! ## Dispatch
//!
//! The dispatcher walks provider lanes in priority order:
//!
//! - [`transport::RelayTransport`] - Trait for one relay provider's API
//! - [`dispatcher::Dispatcher`] - Selects, reserves quota, sends, fails over
//! - [`context::RelayContext`] - HTTP client, sender identity and timeout
//!
//! ## Administration
//!
//! - [`replay::Replayer`] - Re-drives a failed delivery log entry
//! - [`retention::RetentionSweeper`] - Deletes old delivery log entries
//!
//! ## Example
//!
//! ```ignore
//! use courier_relay::{Dispatcher, RelayContext};
//!
//! let ctx = RelayContext::new();
//! let dispatcher = Dispatcher::new(lanes, ledger, log, clock, ctx);
//!
//! let result = dispatcher.dispatch(&message).await;
//! ```

// Core modules
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod replay;
pub mod retention;
pub mod transport;

// Errors
pub use error::{HttpError, RelayError, TransportError};

// Host APIs
pub use host::http::HttpClient;

// Transport & Dispatcher
pub use context::{
    DEFAULT_RELAY_TIMEOUT, RelayContext, RelayContextBuilder, RelaySettings, SenderIdentity,
};
pub use dispatcher::{
    AttemptResult, DispatchResult, Dispatcher, ProviderAttempt, RelayLane, SkipReason,
};
pub use transport::{RelayTransport, TransportReceipt};

// Administration
pub use replay::Replayer;
pub use retention::{RetentionBounds, RetentionSweeper};
