//! Replay of failed deliveries.
//!
//! A replay never reuses stale data from the original dispatch: the account
//! is resolved again, password resets pick up the latest issued token, and
//! the payload is rendered fresh before going back through the dispatcher.

use std::sync::Arc;

use courier_core::{
    AccountDirectory, DeliveryLog, MessageRenderer, OutgoingMessage, RenderContext,
    ValidationError,
};
use tracing::{info, instrument};

use crate::dispatcher::{DispatchResult, Dispatcher};
use crate::error::RelayError;

/// Re-drives failed delivery log entries.
pub struct Replayer {
    dispatcher: Arc<Dispatcher>,
    log: Arc<dyn DeliveryLog>,
    directory: Arc<dyn AccountDirectory>,
    renderer: Arc<dyn MessageRenderer>,
}

impl Replayer {
    /// Creates a replayer.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        log: Arc<dyn DeliveryLog>,
        directory: Arc<dyn AccountDirectory>,
        renderer: Arc<dyn MessageRenderer>,
    ) -> Self {
        Self {
            dispatcher,
            log,
            directory,
            renderer,
        }
    }

    /// Replays the failed entry `log_id`.
    ///
    /// The original entry is left untouched; the dispatch creates a new one.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Validation`] when the entry is missing, not
    /// failed, its recipient no longer resolves, or a password reset has no
    /// issued token. Nothing is dispatched in those cases.
    #[instrument(skip(self))]
    pub async fn replay(&self, log_id: i64) -> Result<DispatchResult, RelayError> {
        let entry = self
            .log
            .get(log_id)
            .await?
            .ok_or(ValidationError::LogEntryNotFound(log_id))?;

        if !entry.is_replayable() {
            return Err(ValidationError::NotReplayable {
                id: log_id,
                status: entry.status,
            }
            .into());
        }

        let account = self
            .directory
            .find_account(&entry.recipient)
            .await?
            .ok_or_else(|| ValidationError::UnknownRecipient(entry.recipient.to_string()))?;

        let reset_token = if entry.message_type.needs_reset_token() {
            let token = self
                .directory
                .latest_reset_token(&account)
                .await?
                .ok_or_else(|| ValidationError::MissingResetToken(account.recipient.to_string()))?;
            Some(token)
        } else {
            None
        };

        let ctx = RenderContext {
            account,
            reset_token,
        };
        let payload = self.renderer.render(&entry.message_type, &ctx)?;
        let message = OutgoingMessage::new(
            entry.message_type.clone(),
            ctx.account.recipient.clone(),
            payload,
        );

        info!(log_id, message_type = %entry.message_type, "Replaying failed delivery");
        let result = self.dispatcher.dispatch(&message).await;
        info!(
            log_id,
            new_log_id = ?result.log_id,
            status = %result.status,
            "Replay finished"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for Replayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replayer")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
