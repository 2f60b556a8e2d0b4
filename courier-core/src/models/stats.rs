//! Aggregated read-only views over the quota ledger and delivery log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::provider::ProviderId;
use super::quota::QuotaCounter;

// ============================================================================
// Hourly Histogram
// ============================================================================

/// Counts per hour of day (UTC), fixed at 24 slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HourlyHistogram([u64; 24]);

impl HourlyHistogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` to the slot for `hour`; hours above 23 are ignored.
    pub fn add(&mut self, hour: u32, count: u64) {
        if let Some(slot) = usize::try_from(hour).ok().and_then(|h| self.0.get_mut(h)) {
            *slot += count;
        }
    }

    /// Returns the count for `hour` (0 for hours above 23).
    pub fn get(&self, hour: u32) -> u64 {
        usize::try_from(hour)
            .ok()
            .and_then(|h| self.0.get(h))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the sum over all hours.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Returns the busiest hour, if anything was recorded.
    pub fn peak_hour(&self) -> Option<u32> {
        let (hour, count) = self
            .0
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
        if *count == 0 {
            return None;
        }
        u32::try_from(hour).ok()
    }

    /// Returns the raw slots.
    pub fn as_slice(&self) -> &[u64; 24] {
        &self.0
    }
}

// ============================================================================
// Today
// ============================================================================

/// One provider's usage for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDayStats {
    /// Provider.
    pub provider: ProviderId,
    /// Whether its credentials are configured.
    pub enabled: bool,
    /// Attempts with a recorded outcome.
    pub attempted: u64,
    /// Accepted attempts.
    pub succeeded: u64,
    /// Failed attempts.
    pub failed: u64,
    /// Daily quota.
    pub daily_quota: u32,
    /// `daily_quota - attempted`, floored at zero.
    pub remaining: u64,
    /// `attempted / daily_quota * 100`.
    pub percentage: f64,
}

impl ProviderDayStats {
    /// Builds the row from a counter and the provider's quota.
    pub fn from_counter(counter: &QuotaCounter, daily_quota: u32, enabled: bool) -> Self {
        Self {
            provider: counter.provider,
            enabled,
            attempted: counter.attempted,
            succeeded: counter.succeeded,
            failed: counter.failed,
            daily_quota,
            remaining: counter.remaining(daily_quota),
            percentage: counter.percentage(daily_quota),
        }
    }
}

/// Combined totals across providers for one day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TotalStats {
    /// Sum of attempts.
    pub attempted: u64,
    /// Sum of accepted attempts.
    pub succeeded: u64,
    /// Sum of failed attempts.
    pub failed: u64,
    /// Sum of daily quotas.
    pub daily_quota: u64,
    /// Sum of remaining attempts.
    pub remaining: u64,
    /// `attempted / daily_quota * 100` over all providers.
    pub percentage: f64,
}

impl TotalStats {
    /// Sums per-provider rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rows(rows: &[ProviderDayStats]) -> Self {
        let mut total = rows.iter().fold(Self::default(), |mut acc, row| {
            acc.attempted += row.attempted;
            acc.succeeded += row.succeeded;
            acc.failed += row.failed;
            acc.daily_quota += u64::from(row.daily_quota);
            acc.remaining += row.remaining;
            acc
        });
        if total.daily_quota > 0 {
            total.percentage = total.attempted as f64 / total.daily_quota as f64 * 100.0;
        }
        total
    }
}

/// The "today" view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayStats {
    /// Day covered.
    pub date: NaiveDate,
    /// Per-provider rows in failover order.
    pub providers: Vec<ProviderDayStats>,
    /// Provider attempts recorded today, by hour.
    pub hourly: HourlyHistogram,
    /// Combined totals.
    pub total: TotalStats,
}

// ============================================================================
// Ranges
// ============================================================================

/// One provider's totals over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTotals {
    /// Provider.
    pub provider: ProviderId,
    /// Attempts with a recorded outcome.
    pub attempted: u64,
    /// Accepted attempts.
    pub succeeded: u64,
    /// Failed attempts.
    pub failed: u64,
}

impl RangeTotals {
    /// Creates zero totals.
    pub fn zero(provider: ProviderId) -> Self {
        Self {
            provider,
            attempted: 0,
            succeeded: 0,
            failed: 0,
        }
    }
}

/// The "week" and "month" views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeStats {
    /// First day (inclusive).
    pub from: NaiveDate,
    /// Last day (inclusive).
    pub to: NaiveDate,
    /// Per-provider totals in failover order.
    pub providers: Vec<RangeTotals>,
}

impl RangeStats {
    /// Sum of attempts over all providers.
    pub fn total_attempted(&self) -> u64 {
        self.providers.iter().map(|p| p.attempted).sum()
    }

    /// Sum of accepted attempts over all providers.
    pub fn total_succeeded(&self) -> u64 {
        self.providers.iter().map(|p| p.succeeded).sum()
    }

    /// Sum of failed attempts over all providers.
    pub fn total_failed(&self) -> u64 {
        self.providers.iter().map(|p| p.failed).sum()
    }
}

// ============================================================================
// Chart
// ============================================================================

/// One provider's counts on one chart day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Provider.
    pub provider: ProviderId,
    /// Attempts.
    pub sent: u64,
    /// Accepted attempts.
    pub success: u64,
    /// Failed attempts.
    pub failed: u64,
}

/// One day of the chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDay {
    /// Day.
    pub date: NaiveDate,
    /// Per-provider points in failover order.
    pub points: Vec<ChartPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_add_and_peak() {
        let mut h = HourlyHistogram::new();
        assert_eq!(h.peak_hour(), None);

        h.add(9, 3);
        h.add(14, 5);
        h.add(14, 1);
        h.add(24, 100);

        assert_eq!(h.get(14), 6);
        assert_eq!(h.get(24), 0);
        assert_eq!(h.total(), 9);
        assert_eq!(h.peak_hour(), Some(14));
    }

    #[test]
    fn test_histogram_peak_prefers_earliest_tie() {
        let mut h = HourlyHistogram::new();
        h.add(20, 2);
        h.add(7, 2);
        assert_eq!(h.peak_hour(), Some(7));
    }

    #[test]
    fn test_total_stats_from_rows() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let brevo = QuotaCounter {
            attempted: 150,
            succeeded: 149,
            failed: 1,
            ..QuotaCounter::zero(ProviderId::Brevo, date)
        };
        let sendgrid = QuotaCounter::zero(ProviderId::SendGrid, date);
        let rows = vec![
            ProviderDayStats::from_counter(&brevo, 300, true),
            ProviderDayStats::from_counter(&sendgrid, 100, true),
        ];

        let total = TotalStats::from_rows(&rows);
        assert_eq!(total.attempted, 150);
        assert_eq!(total.daily_quota, 400);
        assert_eq!(total.remaining, 250);
        assert!((total.percentage - 37.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_range_totals_sum() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let stats = RangeStats {
            from: date,
            to: date,
            providers: vec![
                RangeTotals {
                    provider: ProviderId::Brevo,
                    attempted: 10,
                    succeeded: 8,
                    failed: 2,
                },
                RangeTotals {
                    provider: ProviderId::Mailgun,
                    attempted: 2,
                    succeeded: 2,
                    failed: 0,
                },
            ],
        };
        assert_eq!(stats.total_attempted(), 12);
        assert_eq!(stats.total_succeeded(), 10);
        assert_eq!(stats.total_failed(), 2);
    }
}
