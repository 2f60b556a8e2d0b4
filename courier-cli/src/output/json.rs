//! JSON output formatting.

use anyhow::Result;
use courier_core::{DeliveryStatus, ProviderId};
use courier_relay::{AttemptResult, DispatchResult, ProviderAttempt};
use serde::Serialize;

use super::ProviderRow;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a send or replay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<i64>,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub duration_ms: u64,
    pub attempts: Vec<AttemptOutput>,
}

/// One provider in the failover walk.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutput {
    pub provider: ProviderId,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub duration_ms: u64,
}

/// Provider info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfoOutput {
    pub id: ProviderId,
    pub display_name: String,
    pub priority: u32,
    pub daily_quota: u32,
    pub enabled: bool,
    pub base_url: String,
    pub missing_credentials: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

/// Retention sweep output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeOutput {
    pub older_than_days: u32,
    pub deleted: u64,
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl From<&ProviderAttempt> for AttemptOutput {
    fn from(attempt: &ProviderAttempt) -> Self {
        let (outcome, detail) = match &attempt.result {
            AttemptResult::Skipped { reason } => ("skipped", Some(reason.to_string())),
            AttemptResult::Sent { message_id } => ("sent", message_id.clone()),
            AttemptResult::Failed { error } => ("failed", Some(error.clone())),
        };
        Self {
            provider: attempt.provider,
            outcome,
            detail,
            duration_ms: millis(attempt.duration),
        }
    }
}

impl From<&DispatchResult> for DispatchOutput {
    fn from(result: &DispatchResult) -> Self {
        Self {
            log_id: result.log_id,
            status: result.status,
            provider_id: result.provider,
            error_detail: result.error_detail.clone(),
            duration_ms: millis(result.duration),
            attempts: result.attempts.iter().map(AttemptOutput::from).collect(),
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a dispatch result.
    pub fn format_dispatch(&self, result: &DispatchResult) -> Result<String> {
        self.format(&DispatchOutput::from(result))
    }

    /// Formats the provider list.
    pub fn format_providers(&self, rows: &[ProviderRow]) -> Result<String> {
        let outputs: Vec<ProviderInfoOutput> = rows
            .iter()
            .map(|row| ProviderInfoOutput {
                id: row.descriptor.id,
                display_name: row.descriptor.display_name().to_string(),
                priority: row.provider.priority,
                daily_quota: row.provider.daily_quota,
                enabled: row.provider.enabled,
                base_url: row.base_url.clone(),
                missing_credentials: row.missing.clone(),
                dashboard_url: Some(row.descriptor.metadata.dashboard_url)
                    .filter(|u| !u.is_empty())
                    .map(String::from),
            })
            .collect();

        self.format(&outputs)
    }

    /// Formats a retention sweep.
    pub fn format_purge(&self, deleted: u64, older_than_days: u32) -> Result<String> {
        self.format(&PurgeOutput {
            older_than_days,
            deleted,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_purge_output() {
        let formatter = JsonFormatter::new(false);
        assert_eq!(
            formatter.format_purge(4, 30).unwrap(),
            r#"{"olderThanDays":30,"deleted":4}"#
        );
    }
}
