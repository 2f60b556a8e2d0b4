//! SendGrid transport.

use async_trait::async_trait;
use courier_core::{OutgoingMessage, ProviderId, ProviderSettings};
use courier_relay::transport::read_accepted;
use courier_relay::{HttpClient, RelayContext, RelayTransport, TransportError, TransportReceipt};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::instrument;

use super::api::SendGridSendRequest;
use crate::descriptor::resolve_base_url;

/// Production API base.
pub const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

const SEND_PATH: &str = "/v3/mail/send";
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Delivers through SendGrid's v3 mail send API.
#[derive(Clone)]
pub struct SendGridTransport {
    base_url: String,
    api_key: Option<String>,
}

impl SendGridTransport {
    /// Creates a transport against `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Creates a transport from provider settings.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(
            resolve_base_url(settings, SENDGRID_API_BASE),
            settings.credentials.api_key().map(String::from),
        )
    }

    fn headers(api_key: &str) -> Result<HeaderMap, TransportError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            TransportError::NotConfigured("sendgrid api key is not a valid header value".into())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }
}

impl std::fmt::Debug for SendGridTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl RelayTransport for SendGridTransport {
    fn provider(&self) -> ProviderId {
        ProviderId::SendGrid
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip_all, fields(provider = "sendgrid"))]
    async fn send(
        &self,
        ctx: &RelayContext,
        message: &OutgoingMessage,
    ) -> Result<TransportReceipt, TransportError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TransportError::NotConfigured("sendgrid api_key".into()))?;

        let url = HttpClient::join(&self.base_url, SEND_PATH)?;
        let body = SendGridSendRequest::new(ctx.sender(), message);

        let response = ctx.http.post_json(&url, Self::headers(api_key)?, &body).await?;
        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        read_accepted(response).await?;

        Ok(TransportReceipt { message_id })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{MessagePayload, MessageType, Recipient};
    use courier_relay::SenderIdentity;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> RelayContext {
        RelayContext::builder()
            .sender(SenderIdentity::new("no-reply@example.org", "Example"))
            .build()
    }

    fn message() -> OutgoingMessage {
        OutgoingMessage::new(
            MessageType::Verification,
            Recipient::parse("member@example.org").unwrap(),
            MessagePayload::new("Confirm your address").with_html("<p>confirm</p>"),
        )
    }

    #[tokio::test]
    async fn test_send_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(bearer_token("SG.test"))
            .and(body_partial_json(serde_json::json!({
                "personalizations": [{"to": [{"email": "member@example.org"}]}],
                "content": [{"type": "text/html", "value": "<p>confirm</p>"}]
            })))
            .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "sg-42"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = SendGridTransport::new(server.uri(), Some("SG.test".into()));
        let receipt = transport.send(&ctx(), &message()).await.unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("sg-42"));
    }

    #[tokio::test]
    async fn test_forbidden_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let transport = SendGridTransport::new(server.uri(), Some("SG.revoked".into()));
        let err = transport.send(&ctx(), &message()).await.unwrap_err();
        assert!(matches!(err, TransportError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let transport = SendGridTransport::new(server.uri(), Some("SG.test".into()));
        let err = transport.send(&ctx(), &message()).await.unwrap_err();
        assert!(matches!(err, TransportError::Rejected { status: 503, .. }));
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let settings = ProviderSettings {
            credentials: courier_core::ProviderCredentials::with_api_key("   "),
            ..ProviderSettings::default()
        };
        assert!(!SendGridTransport::from_settings(&settings).is_configured());
    }
}
