//! Brevo wire payloads.

use courier_core::OutgoingMessage;
use courier_relay::SenderIdentity;
use serde::{Deserialize, Serialize};

/// Mailbox as Brevo expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrevoAddress {
    /// Address.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /v3/smtp/email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrevoSendRequest {
    /// From.
    pub sender: BrevoAddress,
    /// Recipients.
    pub to: Vec<BrevoAddress>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    /// Plain-text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

impl BrevoSendRequest {
    /// Maps an outgoing message onto the Brevo body.
    pub fn new(sender: &SenderIdentity, message: &OutgoingMessage) -> Self {
        Self {
            sender: BrevoAddress {
                email: sender.email.clone(),
                name: Some(sender.name.clone()).filter(|n| !n.is_empty()),
            },
            to: vec![BrevoAddress {
                email: message.recipient.to_string(),
                name: None,
            }],
            subject: message.payload.subject.clone(),
            html_content: message.payload.html.clone(),
            text_content: message.payload.text.clone(),
        }
    }
}

/// Success body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrevoSendResponse {
    /// Relay message id.
    #[serde(default)]
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{MessagePayload, MessageType, Recipient};

    #[test]
    fn test_request_shape() {
        let message = OutgoingMessage::new(
            MessageType::Verification,
            Recipient::parse("member@example.org").unwrap(),
            MessagePayload::new("Confirm your address").with_html("<p>hi</p>"),
        );
        let sender = SenderIdentity::new("no-reply@example.org", "Example");
        let json = serde_json::to_value(BrevoSendRequest::new(&sender, &message)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "sender": {"email": "no-reply@example.org", "name": "Example"},
                "to": [{"email": "member@example.org"}],
                "subject": "Confirm your address",
                "htmlContent": "<p>hi</p>"
            })
        );
    }

    #[test]
    fn test_response_message_id() {
        let parsed: BrevoSendResponse =
            serde_json::from_str(r#"{"messageId":"<201798300811.5787683@relay.mailin.fr>"}"#)
                .unwrap();
        assert_eq!(
            parsed.message_id.as_deref(),
            Some("<201798300811.5787683@relay.mailin.fr>")
        );
    }
}
