//! Outgoing message types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

// ============================================================================
// Message Type
// ============================================================================

/// Kind of transactional message.
///
/// Stored and serialized as its snake_case name; unknown names are kept
/// verbatim as [`MessageType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageType {
    /// Account email verification.
    Verification,
    /// Password reset link.
    PasswordReset,
    /// Caller-defined type.
    Other(String),
}

impl MessageType {
    /// Parses a message type name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidMessageType` for blank names or names
    /// containing whitespace.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidMessageType(name.to_string()));
        }
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "verification" => Self::Verification,
            "password_reset" => Self::PasswordReset,
            other => Self::Other(other.to_string()),
        })
    }

    /// Returns the stable name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password_reset",
            Self::Other(name) => name,
        }
    }

    /// Whether a replay must re-resolve a reset token.
    pub fn needs_reset_token(&self) -> bool {
        matches!(self, Self::PasswordReset)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MessageType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// Recipient
// ============================================================================

/// A destination mailbox address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Recipient(String);

impl Recipient {
    /// Parses and validates an address of the form `local@domain.tld`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRecipient` when the address is
    /// malformed.
    pub fn parse(address: &str) -> Result<Self, ValidationError> {
        let trimmed = address.trim();
        let invalid = || ValidationError::InvalidRecipient(address.to_string());

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid());
        }
        let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            return Err(invalid());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, d)| d)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Recipient {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Recipient> for String {
    fn from(value: Recipient) -> Self {
        value.0
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Rendered message content.
///
/// Opaque to the dispatcher; transports map it onto their wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl MessagePayload {
    /// Creates a payload with only a subject.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: None,
            html: None,
        }
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Returns true if neither body is present.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.html.is_none()
    }
}

/// A message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Kind of message.
    pub message_type: MessageType,
    /// Destination.
    pub recipient: Recipient,
    /// Rendered content.
    pub payload: MessagePayload,
}

impl OutgoingMessage {
    /// Creates a new outgoing message.
    pub fn new(message_type: MessageType, recipient: Recipient, payload: MessagePayload) -> Self {
        Self {
            message_type,
            recipient,
            payload,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_parse() {
        assert_eq!(MessageType::parse("verification"), Ok(MessageType::Verification));
        assert_eq!(
            MessageType::parse("Password_Reset"),
            Ok(MessageType::PasswordReset)
        );
        assert_eq!(
            MessageType::parse("event_reminder"),
            Ok(MessageType::Other("event_reminder".to_string()))
        );
        assert!(MessageType::parse("  ").is_err());
        assert!(MessageType::parse("two words").is_err());
    }

    #[test]
    fn test_only_password_reset_needs_token() {
        assert!(MessageType::PasswordReset.needs_reset_token());
        assert!(!MessageType::Verification.needs_reset_token());
        assert!(!MessageType::Other("digest".into()).needs_reset_token());
    }

    #[test]
    fn test_recipient_parse_valid() {
        let r = Recipient::parse("  member@club.example.org ").unwrap();
        assert_eq!(r.as_str(), "member@club.example.org");
        assert_eq!(r.domain(), "club.example.org");
    }

    #[test]
    fn test_recipient_parse_invalid() {
        for bad in [
            "",
            "no-at-sign",
            "@example.org",
            "user@",
            "user@localhost",
            "user@exa..mple.org",
            "a@b@c.org",
            "with space@example.org",
        ] {
            assert!(Recipient::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_payload_builders() {
        let payload = MessagePayload::new("Verify your account");
        assert!(payload.is_empty());

        let payload = payload.with_text("Click the link").with_html("<p>Click</p>");
        assert!(!payload.is_empty());
        assert_eq!(payload.text.as_deref(), Some("Click the link"));
    }
}
