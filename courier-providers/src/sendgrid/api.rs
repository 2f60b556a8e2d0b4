//! SendGrid wire payloads.

use courier_core::OutgoingMessage;
use courier_relay::SenderIdentity;
use serde::{Deserialize, Serialize};

/// Mailbox as SendGrid expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGridAddress {
    /// Address.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGridPersonalization {
    /// Recipients.
    pub to: Vec<SendGridAddress>,
}

/// One body part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGridContent {
    /// MIME type.
    #[serde(rename = "type")]
    pub mime: String,
    /// Body.
    pub value: String,
}

/// Body of `POST /v3/mail/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGridSendRequest {
    /// Envelopes.
    pub personalizations: Vec<SendGridPersonalization>,
    /// From.
    pub from: SendGridAddress,
    /// Subject line.
    pub subject: String,
    /// Body parts; plain text must precede HTML.
    pub content: Vec<SendGridContent>,
}

impl SendGridSendRequest {
    /// Maps an outgoing message onto the SendGrid body.
    pub fn new(sender: &SenderIdentity, message: &OutgoingMessage) -> Self {
        let payload = &message.payload;
        let mut content = Vec::with_capacity(2);
        if let Some(text) = &payload.text {
            content.push(SendGridContent {
                mime: "text/plain".into(),
                value: text.clone(),
            });
        }
        if let Some(html) = &payload.html {
            content.push(SendGridContent {
                mime: "text/html".into(),
                value: html.clone(),
            });
        }
        // SendGrid rejects a message without content.
        if content.is_empty() {
            content.push(SendGridContent {
                mime: "text/plain".into(),
                value: payload.subject.clone(),
            });
        }

        Self {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridAddress {
                    email: message.recipient.to_string(),
                    name: None,
                }],
            }],
            from: SendGridAddress {
                email: sender.email.clone(),
                name: Some(sender.name.clone()).filter(|n| !n.is_empty()),
            },
            subject: payload.subject.clone(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{MessagePayload, MessageType, Recipient};

    fn message(payload: MessagePayload) -> OutgoingMessage {
        OutgoingMessage::new(
            MessageType::Verification,
            Recipient::parse("member@example.org").unwrap(),
            payload,
        )
    }

    #[test]
    fn test_request_shape() {
        let sender = SenderIdentity::new("no-reply@example.org", "Example");
        let payload = MessagePayload::new("Confirm")
            .with_html("<a>link</a>")
            .with_text("link");
        let json = serde_json::to_value(SendGridSendRequest::new(&sender, &message(payload))).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "personalizations": [{"to": [{"email": "member@example.org"}]}],
                "from": {"email": "no-reply@example.org", "name": "Example"},
                "subject": "Confirm",
                "content": [
                    {"type": "text/plain", "value": "link"},
                    {"type": "text/html", "value": "<a>link</a>"}
                ]
            })
        );
    }

    #[test]
    fn test_subject_only_still_has_content() {
        let sender = SenderIdentity::new("no-reply@example.org", "");
        let request = SendGridSendRequest::new(&sender, &message(MessagePayload::new("Ping")));
        assert_eq!(request.content.len(), 1);
        assert_eq!(request.content[0].value, "Ping");
        assert!(request.from.name.is_none());
    }
}
