//! Dispatcher: provider selection, quota reservation and failover.
//!
//! The dispatcher takes a list of provider lanes and walks them in priority
//! order until one relay accepts the message. Every call produces exactly
//! one delivery log entry that ends in `sent` or `failed`.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use courier_core::{
    AttemptOutcome, Clock, DeliveryLog, DeliveryStatus, OutgoingMessage, Provider, ProviderId,
    QuotaLedger,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, info, instrument, warn};

use crate::context::RelayContext;
use crate::error::TransportError;
use crate::transport::{RelayTransport, TransportReceipt};

/// Leading text of the detail stored on a fully failed dispatch.
pub const ALL_PROVIDERS_FAILED: &str = "all providers exhausted or failing";

// ============================================================================
// Relay Lane
// ============================================================================

/// A provider paired with the transport that delivers through it.
#[derive(Clone)]
pub struct RelayLane {
    /// Registry entry (priority, quota, enabled).
    pub provider: Provider,
    /// Transport for this provider.
    pub transport: Arc<dyn RelayTransport>,
}

impl RelayLane {
    /// Creates a lane.
    pub fn new(provider: Provider, transport: Arc<dyn RelayTransport>) -> Self {
        Self {
            provider,
            transport,
        }
    }

    /// Provider id.
    pub fn id(&self) -> ProviderId {
        self.provider.id
    }

    /// A lane is usable only when the registry and the transport agree.
    pub fn is_enabled(&self) -> bool {
        self.provider.enabled && self.transport.is_configured()
    }
}

impl fmt::Debug for RelayLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayLane")
            .field("provider", &self.provider)
            .field("configured", &self.transport.is_configured())
            .finish()
    }
}

// ============================================================================
// Provider Attempt
// ============================================================================

/// Why a provider was passed over without a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum SkipReason {
    /// Credentials are not configured.
    Disabled,
    /// The provider's daily quota is used up.
    Exhausted,
    /// The quota ledger could not be consulted.
    LedgerUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "skipped (not configured)"),
            Self::Exhausted => write!(f, "skipped (daily quota exhausted)"),
            Self::LedgerUnavailable(e) => write!(f, "skipped (quota ledger unavailable: {e})"),
        }
    }
}

/// What happened at one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum AttemptResult {
    /// Not attempted; no quota consumed.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
    /// The relay accepted the message.
    Sent {
        /// Relay-side message id, if returned.
        message_id: Option<String>,
    },
    /// The relay call failed; quota was consumed.
    Failed {
        /// Transport error text.
        error: String,
    },
}

/// Record of a single provider in the failover walk.
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    /// Provider.
    pub provider: ProviderId,
    /// Outcome at this provider.
    pub result: AttemptResult,
    /// How long the attempt took.
    pub duration: Duration,
}

impl ProviderAttempt {
    /// Creates a skip record.
    pub fn skipped(provider: ProviderId, reason: SkipReason) -> Self {
        Self {
            provider,
            result: AttemptResult::Skipped { reason },
            duration: Duration::ZERO,
        }
    }

    /// Creates a successful attempt record.
    pub fn sent(provider: ProviderId, receipt: TransportReceipt, duration: Duration) -> Self {
        Self {
            provider,
            result: AttemptResult::Sent {
                message_id: receipt.message_id,
            },
            duration,
        }
    }

    /// Creates a failed attempt record.
    pub fn failed(provider: ProviderId, error: &TransportError, duration: Duration) -> Self {
        Self {
            provider,
            result: AttemptResult::Failed {
                error: error.to_string(),
            },
            duration,
        }
    }

    /// Whether the transport was actually called.
    pub fn was_attempted(&self) -> bool {
        !matches!(self.result, AttemptResult::Skipped { .. })
    }

    fn describe(&self) -> String {
        match &self.result {
            AttemptResult::Skipped { reason } => format!("{}: {reason}", self.provider),
            AttemptResult::Sent { .. } => format!("{}: sent", self.provider),
            AttemptResult::Failed { error } => format!("{}: {error}", self.provider),
        }
    }
}

// ============================================================================
// Dispatch Result
// ============================================================================

/// The outcome of one dispatch.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Delivery log entry created for this dispatch.
    ///
    /// `None` only when the log itself could not be written.
    pub log_id: Option<i64>,
    /// Terminal status, `Sent` or `Failed`.
    pub status: DeliveryStatus,
    /// Provider that accepted the message, or the last one attempted.
    pub provider: Option<ProviderId>,
    /// Aggregated failure detail.
    pub error_detail: Option<String>,
    /// Every provider considered, in order.
    pub attempts: Vec<ProviderAttempt>,
    /// Total duration.
    pub duration: Duration,
}

impl DispatchResult {
    /// Returns true if a relay accepted the message.
    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }

    /// Providers whose transport was called, in order.
    pub fn attempted_providers(&self) -> Vec<ProviderId> {
        self.attempts
            .iter()
            .filter(|a| a.was_attempted())
            .map(|a| a.provider)
            .collect()
    }

    /// Returns all errors that occurred.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.result {
                AttemptResult::Failed { error } => Some(error.as_str()),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Sends messages through the first provider lane that accepts them.
///
/// Cheap to share: the lanes, stores and context live behind one `Arc`.
pub struct Dispatcher {
    inner: Arc<DispatchCore>,
}

struct DispatchCore {
    lanes: Vec<RelayLane>,
    ledger: Arc<dyn QuotaLedger>,
    log: Arc<dyn DeliveryLog>,
    clock: Arc<dyn Clock>,
    ctx: Arc<RelayContext>,
}

impl Dispatcher {
    /// Creates a dispatcher. Lanes are ordered by ascending priority.
    pub fn new(
        mut lanes: Vec<RelayLane>,
        ledger: Arc<dyn QuotaLedger>,
        log: Arc<dyn DeliveryLog>,
        clock: Arc<dyn Clock>,
        ctx: RelayContext,
    ) -> Self {
        // Lowest priority first, then by id for ties.
        lanes.sort_by(|a, b| a.provider.priority.cmp(&b.provider.priority).then(a.id().cmp(&b.id())));
        Self {
            inner: Arc::new(DispatchCore {
                lanes,
                ledger,
                log,
                clock,
                ctx: Arc::new(ctx),
            }),
        }
    }

    /// Lanes in failover order.
    pub fn lanes(&self) -> &[RelayLane] {
        &self.inner.lanes
    }

    /// The relay context handed to transports.
    pub fn context(&self) -> &RelayContext {
        &self.inner.ctx
    }

    /// The clock used for calendar days and timestamps.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Dispatches one message, failing over across lanes.
    ///
    /// Never returns an error: storage failures are logged and folded into a
    /// failed result. The provider walk runs on its own task, so dropping
    /// this future does not abandon a reserved quota slot or leave the log
    /// entry pending; the walk still finishes and persists its outcome.
    #[instrument(
        skip(self, message),
        fields(message_type = %message.message_type, recipient = %message.recipient)
    )]
    pub async fn dispatch(&self, message: &OutgoingMessage) -> DispatchResult {
        let start = Instant::now();
        let walk = self.spawn_walk(message.clone(), Span::current());

        match walk.await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Dispatch task ended abnormally");
                DispatchResult {
                    log_id: None,
                    status: DeliveryStatus::Failed,
                    provider: None,
                    error_detail: Some(format!("dispatch task failed: {e}")),
                    attempts: Vec::new(),
                    duration: start.elapsed(),
                }
            }
        }
    }

    /// Spawns the dispatch onto the runtime.
    ///
    /// The outcome is persisted whether or not the handle is awaited.
    pub fn dispatch_detached(&self, message: OutgoingMessage) -> JoinHandle<DispatchResult> {
        let span = tracing::info_span!(
            "dispatch_detached",
            message_type = %message.message_type,
            recipient = %message.recipient
        );
        self.spawn_walk(message, span)
    }

    fn spawn_walk(&self, message: OutgoingMessage, span: Span) -> JoinHandle<DispatchResult> {
        let core = Arc::clone(&self.inner);
        tokio::spawn(async move { core.walk(&message).await }.instrument(span))
    }
}

impl DispatchCore {
    async fn walk(&self, message: &OutgoingMessage) -> DispatchResult {
        let start = Instant::now();
        let mut attempts = Vec::with_capacity(self.lanes.len());

        let entry = match self
            .log
            .create_pending(&message.recipient, &message.message_type, self.clock.now())
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Could not create delivery log entry");
                return DispatchResult {
                    log_id: None,
                    status: DeliveryStatus::Failed,
                    provider: None,
                    error_detail: Some(format!("delivery log unavailable: {e}")),
                    attempts,
                    duration: start.elapsed(),
                };
            }
        };
        let log_id = entry.id;
        let today = self.clock.today();

        info!(log_id, lanes = self.lanes.len(), "Dispatching message");

        let mut last_attempted = None;
        for lane in &self.lanes {
            let provider = lane.id();

            if !lane.is_enabled() {
                debug!(provider = %provider, "Provider disabled, skipping");
                attempts.push(ProviderAttempt::skipped(provider, SkipReason::Disabled));
                continue;
            }

            match self
                .ledger
                .reserve(provider, today, lane.provider.daily_quota)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    debug!(provider = %provider, "Daily quota exhausted, skipping");
                    attempts.push(ProviderAttempt::skipped(provider, SkipReason::Exhausted));
                    continue;
                }
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Quota reservation failed, skipping");
                    attempts.push(ProviderAttempt::skipped(
                        provider,
                        SkipReason::LedgerUnavailable(e.to_string()),
                    ));
                    continue;
                }
            }

            last_attempted = Some(provider);
            let hour = attempt_hour(today, self.clock.now());
            let attempt_start = Instant::now();
            let outcome = self.send_bounded(lane, message).await;
            let duration = attempt_start.elapsed();

            match outcome {
                Ok(receipt) => {
                    info!(provider = %provider, log_id, duration = ?duration, "Relay accepted message");
                    self.record(provider, today, hour, AttemptOutcome::Success)
                        .await;
                    attempts.push(ProviderAttempt::sent(provider, receipt, duration));

                    if let Err(e) = self.log.mark_sent(log_id, provider, self.clock.now()).await {
                        warn!(log_id, error = %e, "Could not mark delivery as sent");
                    }

                    return DispatchResult {
                        log_id: Some(log_id),
                        status: DeliveryStatus::Sent,
                        provider: Some(provider),
                        error_detail: None,
                        attempts,
                        duration: start.elapsed(),
                    };
                }
                Err(error) => {
                    warn!(
                        provider = %provider,
                        error = %error,
                        duration = ?duration,
                        "Relay attempt failed"
                    );
                    self.record(provider, today, hour, AttemptOutcome::Failure)
                        .await;
                    attempts.push(ProviderAttempt::failed(provider, &error, duration));
                }
            }
        }

        let detail = failure_detail(&attempts);
        warn!(log_id, detail = %detail, "All providers exhausted or failing");

        if let Err(e) = self
            .log
            .mark_failed(log_id, last_attempted, &detail, self.clock.now())
            .await
        {
            warn!(log_id, error = %e, "Could not mark delivery as failed");
        }

        DispatchResult {
            log_id: Some(log_id),
            status: DeliveryStatus::Failed,
            provider: last_attempted,
            error_detail: Some(detail),
            attempts,
            duration: start.elapsed(),
        }
    }

    async fn send_bounded(
        &self,
        lane: &RelayLane,
        message: &OutgoingMessage,
    ) -> Result<TransportReceipt, TransportError> {
        let timeout = self.ctx.timeout();
        match tokio::time::timeout(timeout, lane.transport.send(&self.ctx, message)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Records an outcome, or hands the reservation back if that fails.
    async fn record(&self, provider: ProviderId, date: NaiveDate, hour: u32, outcome: AttemptOutcome) {
        let Err(e) = self
            .ledger
            .record_outcome(provider, date, hour, outcome)
            .await
        else {
            return;
        };
        warn!(provider = %provider, error = %e, "Could not record attempt outcome, releasing slot");
        if let Err(e) = self.ledger.release(provider, date).await {
            warn!(provider = %provider, error = %e, "Could not release quota reservation");
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lanes", &self.inner.lanes)
            .field("ctx", &self.inner.ctx)
            .finish_non_exhaustive()
    }
}

/// UTC hour an attempt is counted under. An attempt that starts after
/// midnight still belongs to the day its slot was reserved on, so it goes
/// in that day's last hour.
fn attempt_hour(day: NaiveDate, at: DateTime<Utc>) -> u32 {
    if at.date_naive() == day { at.hour() } else { 23 }
}

fn failure_detail(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return format!("{ALL_PROVIDERS_FAILED}: no providers registered");
    }
    let reasons: Vec<String> = attempts.iter().map(ProviderAttempt::describe).collect();
    format!("{ALL_PROVIDERS_FAILED}: {}", reasons.join("; "))
}

// ============================================================================
// Tests
// ============================================================================
