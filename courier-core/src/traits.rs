//! Trait definitions for Courier.
//!
//! This module defines the seams between the dispatcher and everything it
//! talks to: the persistent quota ledger and delivery log, the read model
//! used by the stats views, the surrounding application's account
//! directory and renderer, and the clock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Mutex;

use crate::error::CoreError;
use crate::models::{
    Account, AttemptOutcome, DeliveryLogEntry, HourlyHistogram, MessagePayload, MessageType,
    ProviderId, QuotaCounter, RangeTotals, Recipient, RenderContext, ResetToken,
};

// ============================================================================
// Quota Ledger
// ============================================================================

/// Persistent per-provider, per-day send counters.
///
/// Implementations must make [`QuotaLedger::reserve`] a single atomic
/// check-and-increment: two racing callers can never both be admitted past
/// `daily_quota`.
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    /// Reserves one attempt slot for `provider` on `date`.
    ///
    /// Returns `false` when the provider is exhausted for that day.
    async fn reserve(
        &self,
        provider: ProviderId,
        date: NaiveDate,
        daily_quota: u32,
    ) -> Result<bool, CoreError>;

    /// Records the outcome of a previously reserved attempt made during
    /// UTC `hour` of `date`.
    async fn record_outcome(
        &self,
        provider: ProviderId,
        date: NaiveDate,
        hour: u32,
        outcome: AttemptOutcome,
    ) -> Result<(), CoreError>;

    /// Gives back a reserved slot whose outcome can no longer be recorded.
    async fn release(&self, provider: ProviderId, date: NaiveDate) -> Result<(), CoreError>;

    /// Reads the counter, returning zeros when no row exists.
    async fn get(&self, provider: ProviderId, date: NaiveDate) -> Result<QuotaCounter, CoreError>;
}

// ============================================================================
// Delivery Log
// ============================================================================

/// Persistent per-message audit trail.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Creates a `pending` entry.
    async fn create_pending(
        &self,
        recipient: &Recipient,
        message_type: &MessageType,
        created_at: DateTime<Utc>,
    ) -> Result<DeliveryLogEntry, CoreError>;

    /// Transitions a pending entry to `sent`.
    async fn mark_sent(
        &self,
        id: i64,
        provider: ProviderId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), CoreError>;

    /// Transitions a pending entry to `failed`.
    async fn mark_failed(
        &self,
        id: i64,
        provider: Option<ProviderId>,
        detail: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<(), CoreError>;

    /// Fetches one entry.
    async fn get(&self, id: i64) -> Result<Option<DeliveryLogEntry>, CoreError>;

    /// Deletes every entry created strictly before `cutoff`.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, CoreError>;
}

// ============================================================================
// Stats Read Model
// ============================================================================

/// Query interface backing the stats views.
///
/// Keeps the aggregator independent of the storage engine.
#[async_trait]
pub trait StatsReadModel: Send + Sync {
    /// All counters that exist for `date`.
    async fn counters_for_day(&self, date: NaiveDate) -> Result<Vec<QuotaCounter>, CoreError>;

    /// Per-provider totals over `from..=to`, for providers with any rows.
    async fn range_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RangeTotals>, CoreError>;

    /// Every counter in `from..=to`.
    async fn daily_series(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<QuotaCounter>, CoreError>;

    /// Provider attempts recorded on `date`, by UTC hour.
    async fn hourly_attempts(&self, date: NaiveDate) -> Result<HourlyHistogram, CoreError>;

    /// The most recent `limit` log entries, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<DeliveryLogEntry>, CoreError>;
}

// ============================================================================
// Collaborators
// ============================================================================

/// Account lookup owned by the surrounding application.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolves a mailbox to an account.
    async fn find_account(&self, recipient: &Recipient) -> Result<Option<Account>, CoreError>;

    /// Returns the most recently issued reset token for an account.
    async fn latest_reset_token(&self, account: &Account)
        -> Result<Option<ResetToken>, CoreError>;
}

/// Renders message content for a replay.
pub trait MessageRenderer: Send + Sync {
    /// Produces the payload for `message_type`.
    fn render(
        &self,
        message_type: &MessageType,
        ctx: &RenderContext,
    ) -> Result<MessagePayload, CoreError>;
}

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time; calendar days are UTC.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replays of historical data.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_today_is_utc_day() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());

        clock.advance(Duration::minutes(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let later = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
