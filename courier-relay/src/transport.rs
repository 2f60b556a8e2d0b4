//! Relay transport trait and types.
//!
//! A transport represents one provider's delivery API. The dispatcher owns
//! the ordering, quota and failover; a transport only knows how to hand one
//! message to its relay.

use async_trait::async_trait;
use courier_core::{OutgoingMessage, ProviderId};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::context::RelayContext;
use crate::error::TransportError;
use crate::host::http::{ResponseExt, body_excerpt};

// ============================================================================
// Transport Receipt
// ============================================================================

/// What a relay told us when it accepted a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportReceipt {
    /// Relay-side message id, when the API returns one.
    pub message_id: Option<String>,
}

impl TransportReceipt {
    /// Creates a receipt carrying a relay message id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            message_id: Some(id.into()),
        }
    }
}

// ============================================================================
// Relay Transport Trait
// ============================================================================

/// One relay provider's delivery API.
///
/// ## Implementing a Transport
///
/// ```ignore
/// struct ExampleTransport { api_key: Option<String> }
///
/// #[async_trait]
/// impl RelayTransport for ExampleTransport {
///     fn provider(&self) -> ProviderId {
///         ProviderId::Brevo
///     }
///
///     fn is_configured(&self) -> bool {
///         self.api_key.is_some()
///     }
///
///     async fn send(
///         &self,
///         ctx: &RelayContext,
///         message: &OutgoingMessage,
///     ) -> Result<TransportReceipt, TransportError> {
///         let response = ctx.http.post_json(&url, headers, &body).await?;
///         read_accepted(response).await?;
///         Ok(TransportReceipt::default())
///     }
/// }
/// ```
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Provider this transport delivers through.
    fn provider(&self) -> ProviderId;

    /// Whether credentials for this provider are present.
    ///
    /// Must not touch the network.
    fn is_configured(&self) -> bool;

    /// Hands one message to the relay.
    async fn send(
        &self,
        ctx: &RelayContext,
        message: &OutgoingMessage,
    ) -> Result<TransportReceipt, TransportError>;
}

// ============================================================================
// Response Handling
// ============================================================================

/// Reads a relay response, returning its body when the status is 2xx.
///
/// 401 and 403 become [`TransportError::AuthenticationFailed`]; any other
/// non-success status becomes [`TransportError::Rejected`].
pub async fn read_accepted(response: Response) -> Result<String, TransportError> {
    let status = response.status();
    let auth_failure = response.is_auth_failure();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Http(e.into()))?;

    if status.is_success() {
        return Ok(body);
    }
    if auth_failure {
        return Err(TransportError::AuthenticationFailed(format!(
            "status {}: {}",
            status.as_u16(),
            body_excerpt(&body)
        )));
    }
    Err(TransportError::Rejected {
        status: status.as_u16(),
        body: body_excerpt(&body),
    })
}
