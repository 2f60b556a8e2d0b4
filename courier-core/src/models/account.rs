//! Account data supplied by the surrounding application.
//!
//! The dispatcher never owns accounts; it only reads them through
//! [`crate::AccountDirectory`] when replaying a failed delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Recipient;

/// A member account as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Application-side identifier.
    pub id: String,
    /// Mailbox for this account.
    pub recipient: Recipient,
    /// Name used in greetings, if known.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// An issued password reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetToken {
    /// Opaque token value.
    pub token: String,
    /// When it was issued.
    pub issued_at: DateTime<Utc>,
}

/// Inputs handed to a [`crate::MessageRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Resolved account.
    pub account: Account,
    /// Latest reset token, for password reset messages.
    pub reset_token: Option<ResetToken>,
}
