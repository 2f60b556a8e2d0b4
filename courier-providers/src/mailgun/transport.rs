//! Mailgun transport.

use async_trait::async_trait;
use courier_core::{OutgoingMessage, ProviderId, ProviderSettings};
use courier_relay::transport::read_accepted;
use courier_relay::{HttpClient, RelayContext, RelayTransport, TransportError, TransportReceipt};
use tracing::{debug, instrument};

use super::api::{MailgunSendForm, MailgunSendResponse};
use crate::descriptor::resolve_base_url;

/// Production API base (US region).
pub const MAILGUN_API_BASE: &str = "https://api.mailgun.net";

/// Basic auth user Mailgun expects alongside the key.
const BASIC_AUTH_USER: &str = "api";

/// Delivers through Mailgun's messages API.
#[derive(Clone)]
pub struct MailgunTransport {
    base_url: String,
    api_key: Option<String>,
    domain: Option<String>,
}

impl MailgunTransport {
    /// Creates a transport against `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        domain: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            domain,
        }
    }

    /// Creates a transport from provider settings.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let creds = &settings.credentials;
        Self::new(
            resolve_base_url(settings, MAILGUN_API_BASE),
            creds.api_key().map(String::from),
            creds.sending_domain().map(String::from),
        )
    }
}

impl std::fmt::Debug for MailgunTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .finish()
    }
}

#[async_trait]
impl RelayTransport for MailgunTransport {
    fn provider(&self) -> ProviderId {
        ProviderId::Mailgun
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.domain.is_some()
    }

    #[instrument(skip_all, fields(provider = "mailgun"))]
    async fn send(
        &self,
        ctx: &RelayContext,
        message: &OutgoingMessage,
    ) -> Result<TransportReceipt, TransportError> {
        let (Some(api_key), Some(domain)) = (self.api_key.as_deref(), self.domain.as_deref())
        else {
            return Err(TransportError::NotConfigured(
                "mailgun api_key and domain".into(),
            ));
        };

        let url = HttpClient::join(&self.base_url, &format!("/v3/{domain}/messages"))?;
        let form = MailgunSendForm::new(ctx.sender(), message);

        let response = ctx
            .http
            .post_form_basic_auth(&url, BASIC_AUTH_USER, api_key, &form)
            .await?;
        let text = read_accepted(response).await?;

        let parsed: MailgunSendResponse = serde_json::from_str(&text).unwrap_or_else(|e| {
            debug!(error = %e, "Mailgun accepted the message without a readable body");
            MailgunSendResponse::default()
        });
        if let Some(status) = &parsed.message {
            debug!(status = %status, "Mailgun queued message");
        }
        Ok(TransportReceipt {
            message_id: parsed.id,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{MessagePayload, MessageType, ProviderCredentials, Recipient};
    use courier_relay::SenderIdentity;
    use wiremock::matchers::{basic_auth, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> RelayContext {
        RelayContext::builder()
            .sender(SenderIdentity::new("no-reply@example.org", "Example"))
            .build()
    }

    fn message() -> OutgoingMessage {
        OutgoingMessage::new(
            MessageType::PasswordReset,
            Recipient::parse("member@example.org").unwrap(),
            MessagePayload::new("Reset").with_text("open the link"),
        )
    }

    #[tokio::test]
    async fn test_send_posts_form_to_domain() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mg.example.org/messages"))
            .and(basic_auth("api", "key-test"))
            .and(body_string_contains("to=member%40example.org"))
            .and(body_string_contains("subject=Reset"))
            .and(body_string_contains("text=open+the+link"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "<20260615.1@mg.example.org>",
                "message": "Queued. Thank you."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = MailgunTransport::new(
            server.uri(),
            Some("key-test".into()),
            Some("mg.example.org".into()),
        );
        let receipt = transport.send(&ctx(), &message()).await.unwrap();
        assert_eq!(
            receipt.message_id.as_deref(),
            Some("<20260615.1@mg.example.org>")
        );

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).to_string();
        assert!(body.contains("from=Example+%3Cno-reply%40example.org%3E"));
        assert!(!body.contains("html="));
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let transport =
            MailgunTransport::new(server.uri(), Some("bad".into()), Some("mg.example.org".into()));
        let err = transport.send(&ctx(), &message()).await.unwrap_err();
        assert!(matches!(err, TransportError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_key_without_domain_is_not_configured() {
        let settings = ProviderSettings {
            credentials: ProviderCredentials::with_api_key("key-test"),
            ..ProviderSettings::default()
        };
        let transport = MailgunTransport::from_settings(&settings);
        assert!(!transport.is_configured());
        let err = transport.send(&ctx(), &message()).await.unwrap_err();
        assert!(matches!(err, TransportError::NotConfigured(_)));
    }
}
