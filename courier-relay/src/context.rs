//! Relay context shared by every transport.
//!
//! The context is passed to each transport call and provides the HTTP
//! client, the sender identity and the per-call timeout.

use std::sync::Arc;
use std::time::Duration;

use crate::host::http::HttpClient;

/// Default bound on a single provider call.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Relay Settings
// ============================================================================

/// The `From` identity used on every outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    /// Sender mailbox.
    pub email: String,
    /// Sender display name.
    pub name: String,
}

impl SenderIdentity {
    /// Creates a sender identity.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    /// Formats as `Name <email>`.
    pub fn mailbox(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self::new("no-reply@localhost", "Courier")
    }
}

/// Settings for relay calls.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Bound on a single provider call.
    pub timeout: Duration,
    /// Sender identity.
    pub sender: SenderIdentity,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RELAY_TIMEOUT,
            sender: SenderIdentity::default(),
        }
    }
}

impl RelaySettings {
    /// Creates settings with custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates settings with a custom sender.
    pub fn with_sender(mut self, sender: SenderIdentity) -> Self {
        self.sender = sender;
        self
    }
}

// ============================================================================
// Relay Context
// ============================================================================

/// Context provided to relay transports.
pub struct RelayContext {
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    /// Relay settings.
    pub settings: RelaySettings,
}

impl RelayContext {
    /// Creates a new relay context with default settings.
    pub fn new() -> Self {
        Self::with_settings(RelaySettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: RelaySettings) -> Self {
        Self {
            http: Arc::new(HttpClient::with_timeout(settings.timeout)),
            settings,
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> RelayContextBuilder {
        RelayContextBuilder::new()
    }

    /// Returns the bound on a single provider call.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Returns the sender identity.
    pub fn sender(&self) -> &SenderIdentity {
        &self.settings.sender
    }
}

impl Default for RelayContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RelayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Relay Context Builder
// ============================================================================

/// Builder for constructing a `RelayContext`.
#[derive(Default)]
pub struct RelayContextBuilder {
    http: Option<Arc<HttpClient>>,
    settings: RelaySettings,
}

impl RelayContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the relay settings.
    pub fn settings(mut self, settings: RelaySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Sets the sender identity.
    pub fn sender(mut self, sender: SenderIdentity) -> Self {
        self.settings.sender = sender;
        self
    }

    /// Builds the relay context.
    pub fn build(self) -> RelayContext {
        let timeout = self.settings.timeout;
        RelayContext {
            http: self
                .http
                .unwrap_or_else(|| Arc::new(HttpClient::with_timeout(timeout))),
            settings: self.settings,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
