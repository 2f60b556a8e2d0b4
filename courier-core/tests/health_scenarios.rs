//! Integration tests for derived provider health.

use chrono::NaiveDate;
use courier_core::{HealthStatus, ProviderDayStats, ProviderId, QuotaCounter, ServiceHealth};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn counter(provider: ProviderId, succeeded: u64, failed: u64) -> QuotaCounter {
    QuotaCounter {
        attempted: succeeded + failed,
        succeeded,
        failed,
        ..QuotaCounter::zero(provider, day())
    }
}

#[test]
fn test_primary_at_quota_is_exhausted() {
    let c = counter(ProviderId::Brevo, 290, 10);
    let health = ServiceHealth::from_counter(true, 300, &c);

    assert!((health.percentage - 100.0).abs() < f64::EPSILON);
    assert_eq!(health.status, HealthStatus::Exhausted);
    assert!(c.is_exhausted(300));
}

#[test]
fn test_secondary_at_81_percent_is_warning_but_admissible() {
    let c = counter(ProviderId::SendGrid, 81, 0);
    let health = ServiceHealth::from_counter(true, 100, &c);
    let row = ProviderDayStats::from_counter(&c, 100, true);

    assert_eq!(health.status, HealthStatus::Warning);
    assert_eq!(row.remaining, 19);
    assert!(!c.is_exhausted(100));
}

#[test]
fn test_disabled_provider_is_inactive_regardless_of_usage() {
    let c = counter(ProviderId::Mailgun, 0, 0);
    assert_eq!(
        ServiceHealth::from_counter(false, 100, &c).status,
        HealthStatus::Inactive
    );
}
