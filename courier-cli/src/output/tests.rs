//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use courier_core::{
    DeliveryLogEntry, DeliveryStatus, HealthStatus, HourlyHistogram, MessageType, ProviderDayStats,
    ProviderId, Recipient, ServiceHealth, TodayStats, TotalStats,
};
use courier_relay::{AttemptResult, DispatchResult, ProviderAttempt, SkipReason};

fn failover_result() -> DispatchResult {
    DispatchResult {
        log_id: Some(7),
        status: DeliveryStatus::Sent,
        provider: Some(ProviderId::SendGrid),
        error_detail: None,
        attempts: vec![
            ProviderAttempt {
                provider: ProviderId::Brevo,
                result: AttemptResult::Skipped {
                    reason: SkipReason::Exhausted,
                },
                duration: Duration::ZERO,
            },
            ProviderAttempt {
                provider: ProviderId::SendGrid,
                result: AttemptResult::Sent {
                    message_id: Some("sg-123".into()),
                },
                duration: Duration::from_millis(40),
            },
        ],
        duration: Duration::from_millis(42),
    }
}

fn exhausted_result() -> DispatchResult {
    DispatchResult {
        log_id: Some(8),
        status: DeliveryStatus::Failed,
        provider: None,
        error_detail: Some("brevo: skipped (not configured)".into()),
        attempts: vec![ProviderAttempt {
            provider: ProviderId::Brevo,
            result: AttemptResult::Skipped {
                reason: SkipReason::Disabled,
            },
            duration: Duration::ZERO,
        }],
        duration: Duration::from_millis(1),
    }
}

fn today_stats() -> TodayStats {
    let providers = vec![
        ProviderDayStats {
            provider: ProviderId::Brevo,
            enabled: true,
            attempted: 250,
            succeeded: 248,
            failed: 2,
            daily_quota: 300,
            remaining: 50,
            percentage: 83.3,
        },
        ProviderDayStats {
            provider: ProviderId::Mailgun,
            enabled: false,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            daily_quota: 100,
            remaining: 100,
            percentage: 0.0,
        },
    ];
    let mut hourly = HourlyHistogram::new();
    hourly.add(9, 200);
    hourly.add(14, 50);

    TodayStats {
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        total: TotalStats::from_rows(&providers),
        providers,
        hourly,
    }
}

// ============================================================================
// Text Formatter
// ============================================================================

mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use super::*;

    #[test]
    fn test_progress_bar_half() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(50.0), "█████░░░░░");
    }

    #[test]
    fn test_progress_bar_boundary_values() {
        let formatter = TextFormatter::new(false);

        let test_cases = vec![
            (0.0, "░░░░░░░░░░"),
            (10.0, "█░░░░░░░░░"),
            (25.0, "███░░░░░░░"),
            (75.0, "████████░░"),
            (100.0, "██████████"),
        ];

        for (percent, expected) in test_cases {
            assert_eq!(formatter.progress_bar(percent), expected, "Failed for {percent}%");
        }
    }

    #[test]
    fn test_dispatch_lists_each_provider() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_dispatch(&failover_result());

        assert!(output.starts_with("Sent via SendGrid (log #7"));
        assert!(output.contains("skipped (daily quota exhausted)"));
        assert!(output.contains("accepted sg-123"));
        assert!(!output.contains("Detail:"));
    }

    #[test]
    fn test_dispatch_failure_shows_detail() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_dispatch(&exhausted_result());

        assert!(output.starts_with("Failed (log #8"));
        assert!(output.contains("Detail: brevo: skipped (not configured)"));
    }

    #[test]
    fn test_no_colors_has_no_escapes() {
        let formatter = TextFormatter::new(false);
        assert!(!formatter.format_dispatch(&failover_result()).contains("\x1b["));
        assert!(!formatter.format_today(&today_stats()).contains("\x1b["));
    }

    #[test]
    fn test_today_rows_and_peak() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_today(&today_stats());

        assert!(output.contains("Today (2024-03-09)"));
        assert!(output.contains("250/300"));
        assert!(output.contains("not configured"));
        assert!(output.contains("Busiest hour: 09:00 UTC (200 attempts)"));
        assert!(output.contains("Total: 250 attempted, 248 succeeded, 2 failed, 150 remaining"));
    }

    #[test]
    fn test_recent_entries() {
        let formatter = TextFormatter::new(false);
        let entries = vec![DeliveryLogEntry {
            id: 12,
            recipient: Recipient::parse("member@example.org").unwrap(),
            message_type: MessageType::PasswordReset,
            provider: None,
            status: DeliveryStatus::Failed,
            error_detail: Some("mailgun: HTTP 401".into()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap(),
            completed_at: None,
        }];

        let output = formatter.format_recent(&entries);
        assert!(output.contains("2024-03-09 08:30:00"));
        assert!(output.contains("password_reset"));
        assert!(output.contains("mailgun: HTTP 401"));
        assert_eq!(formatter.format_recent(&[]), "No deliveries recorded");
    }

    #[test]
    fn test_health_uses_status_label() {
        let formatter = TextFormatter::new(false);
        let health = vec![ServiceHealth {
            provider: ProviderId::Brevo,
            enabled: true,
            today_usage: 300,
            daily_quota: 300,
            percentage: 100.0,
            status: HealthStatus::Exhausted,
        }];

        let output = formatter.format_health(&health);
        assert!(output.contains("Exhausted"));
        assert!(output.contains("300/300 (100%)"));
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use super::*;

    #[test]
    fn test_dispatch_json() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_dispatch(&failover_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["logId"], 7);
        assert_eq!(value["status"], "sent");
        assert_eq!(value["providerId"], "sendgrid");
        assert_eq!(value["durationMs"], 42);
        assert!(value.get("errorDetail").is_none());

        let attempts = value["attempts"].as_array().unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0]["outcome"], "skipped");
        assert_eq!(attempts[1]["outcome"], "sent");
        assert_eq!(attempts[1]["detail"], "sg-123");
    }

    #[test]
    fn test_failed_dispatch_json() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_dispatch(&exhausted_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["status"], "failed");
        assert!(value.get("providerId").is_none());
        assert_eq!(value["errorDetail"], "brevo: skipped (not configured)");
    }

    #[test]
    fn test_today_json() {
        let formatter = JsonFormatter::new(true);
        let output = formatter.format(&today_stats()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["date"], "2024-03-09");
        assert_eq!(value["providers"][0]["provider"], "brevo");
        assert_eq!(value["hourly"][9], 200);
        assert_eq!(value["total"]["remaining"], 150);
    }

    #[test]
    fn test_providers_json() {
        let formatter = JsonFormatter::new(false);
        let rows = crate::commands::providers::rows(&courier_store::Config::default());
        let output = formatter.format_providers(&rows).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["id"], "brevo");
        assert_eq!(list[0]["enabled"], false);
        assert_eq!(list[0]["missingCredentials"][0], "api_key");
    }
}
