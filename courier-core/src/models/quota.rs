//! Quota accounting types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::provider::ProviderId;

/// Outcome of one provider attempt, as recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The relay accepted the message.
    Success,
    /// The relay rejected the message or the call failed.
    Failure,
}

/// Per-provider, per-day sending counters.
///
/// Absent rows are represented as all-zero counters; there is no pre-seeding.
/// `attempted = succeeded + failed` always holds. `reserved` counts admitted
/// attempts whose outcome has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCounter {
    /// Provider these counters belong to.
    pub provider: ProviderId,
    /// Calendar day (UTC).
    pub date: NaiveDate,
    /// Attempts with a recorded outcome.
    pub attempted: u64,
    /// Attempts the relay accepted.
    pub succeeded: u64,
    /// Attempts that failed.
    pub failed: u64,
    /// Admitted attempts still in flight.
    #[serde(default)]
    pub reserved: u64,
}

impl QuotaCounter {
    /// Creates a zero-valued counter.
    pub fn zero(provider: ProviderId, date: NaiveDate) -> Self {
        Self {
            provider,
            date,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            reserved: 0,
        }
    }

    /// Returns the remaining attempts for the day, never negative.
    pub fn remaining(&self, daily_quota: u32) -> u64 {
        u64::from(daily_quota).saturating_sub(self.attempted)
    }

    /// Returns `attempted / daily_quota * 100`.
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self, daily_quota: u32) -> f64 {
        if daily_quota == 0 {
            return 100.0;
        }
        self.attempted as f64 / f64::from(daily_quota) * 100.0
    }

    /// Returns true if no further attempts may be admitted today.
    pub fn is_exhausted(&self, daily_quota: u32) -> bool {
        self.attempted + self.reserved >= u64::from(daily_quota)
    }

    /// Checks the `attempted = succeeded + failed` invariant.
    pub fn is_consistent(&self) -> bool {
        self.attempted == self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_zero_counter() {
        let c = QuotaCounter::zero(ProviderId::Brevo, day());
        assert!(c.is_consistent());
        assert_eq!(c.remaining(300), 300);
        assert!((c.percentage(300) - 0.0).abs() < f64::EPSILON);
        assert!(!c.is_exhausted(300));
    }

    #[test]
    fn test_remaining_saturates() {
        let c = QuotaCounter {
            attempted: 120,
            succeeded: 100,
            failed: 20,
            ..QuotaCounter::zero(ProviderId::SendGrid, day())
        };
        assert_eq!(c.remaining(100), 0);
        assert!(c.is_exhausted(100));
        assert!((c.percentage(100) - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reserved_counts_towards_exhaustion() {
        let c = QuotaCounter {
            attempted: 99,
            succeeded: 99,
            reserved: 1,
            ..QuotaCounter::zero(ProviderId::Mailgun, day())
        };
        assert!(c.is_exhausted(100));
        assert_eq!(c.remaining(100), 1);
    }
}
