//! Mailgun wire payloads.

use courier_core::OutgoingMessage;
use courier_relay::SenderIdentity;
use serde::{Deserialize, Serialize};

/// Form body of `POST /v3/{domain}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailgunSendForm {
    /// `Name <address>` mailbox.
    pub from: String,
    /// Recipient.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl MailgunSendForm {
    /// Maps an outgoing message onto the Mailgun form.
    pub fn new(sender: &SenderIdentity, message: &OutgoingMessage) -> Self {
        Self {
            from: sender.mailbox(),
            to: message.recipient.to_string(),
            subject: message.payload.subject.clone(),
            text: message.payload.text.clone(),
            html: message.payload.html.clone(),
        }
    }
}

/// Success body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailgunSendResponse {
    /// Relay message id.
    #[serde(default)]
    pub id: Option<String>,
    /// Status text, usually "Queued. Thank you.".
    #[serde(default)]
    pub message: Option<String>,
}
