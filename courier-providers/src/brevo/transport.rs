//! Brevo transport.

use async_trait::async_trait;
use courier_core::{OutgoingMessage, ProviderId, ProviderSettings};
use courier_relay::transport::read_accepted;
use courier_relay::{HttpClient, RelayContext, RelayTransport, TransportError, TransportReceipt};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use super::api::{BrevoSendRequest, BrevoSendResponse};
use crate::descriptor::resolve_base_url;

/// Production API base.
pub const BREVO_API_BASE: &str = "https://api.brevo.com";

const SEND_PATH: &str = "/v3/smtp/email";

/// Delivers through Brevo's transactional email API.
#[derive(Clone)]
pub struct BrevoTransport {
    base_url: String,
    api_key: Option<String>,
}

impl BrevoTransport {
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
            resolve_base_url(settings, BREVO_API_BASE),
            settings.credentials.api_key().map(String::from),
        )
    }

    fn headers(api_key: &str) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| {
            TransportError::NotConfigured("brevo api key is not a valid header value".into())
        })?;
        headers.insert("api-key", key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl std::fmt::Debug for BrevoTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrevoTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl RelayTransport for BrevoTransport {
    fn provider(&self) -> ProviderId {
        ProviderId::Brevo
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip_all, fields(provider = "brevo"))]
    async fn send(
        &self,
        ctx: &RelayContext,
        message: &OutgoingMessage,
    ) -> Result<TransportReceipt, TransportError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TransportError::NotConfigured("brevo api_key".into()))?;

        let url = HttpClient::join(&self.base_url, SEND_PATH)?;
        let body = BrevoSendRequest::new(ctx.sender(), message);

        let response = ctx.http.post_json(&url, Self::headers(api_key)?, &body).await?;
        let text = read_accepted(response).await?;

        let parsed: BrevoSendResponse = serde_json::from_str(&text).unwrap_or_else(|e| {
            debug!(error = %e, "Brevo accepted the message without a readable body");
            BrevoSendResponse::default()
        });
        Ok(TransportReceipt {
            message_id: parsed.message_id,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
