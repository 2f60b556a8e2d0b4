//! Delivery log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::message::{MessageType, Recipient};
use super::provider::ProviderId;

/// Lifecycle state of a delivery log entry.
///
/// `Pending` transitions exactly once to `Sent` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Dispatch in progress.
    Pending,
    /// Accepted by a relay.
    Sent,
    /// Every provider was skipped or failed.
    Failed,
}

impl DeliveryStatus {
    /// Returns the stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Returns true for `Sent` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// Audit record for a single dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLogEntry {
    /// Row id.
    pub id: i64,
    /// Destination.
    pub recipient: Recipient,
    /// Kind of message.
    pub message_type: MessageType,
    /// Provider that delivered it, or the last one attempted.
    pub provider: Option<ProviderId>,
    /// Current status.
    pub status: DeliveryStatus,
    /// Failure detail, present iff `status` is `Failed`.
    pub error_detail: Option<String>,
    /// When the dispatch started.
    pub created_at: DateTime<Utc>,
    /// When the terminal state was reached.
    pub completed_at: Option<DateTime<Utc>>,
}

impl DeliveryLogEntry {
    /// Checks the per-status field invariants.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            DeliveryStatus::Pending => self.error_detail.is_none() && self.completed_at.is_none(),
            DeliveryStatus::Sent => self.provider.is_some() && self.error_detail.is_none(),
            DeliveryStatus::Failed => self.error_detail.is_some(),
        }
    }

    /// Returns true if this entry may be replayed.
    pub fn is_replayable(&self) -> bool {
        self.status == DeliveryStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: DeliveryStatus) -> DeliveryLogEntry {
        DeliveryLogEntry {
            id: 1,
            recipient: Recipient::parse("member@example.org").unwrap(),
            message_type: MessageType::Verification,
            provider: None,
            status,
            error_detail: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("sent".parse::<DeliveryStatus>(), Ok(DeliveryStatus::Sent));
        assert!("bounced".parse::<DeliveryStatus>().is_err());
        assert!(!DeliveryStatus::Pending.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
    }

    #[test]
    fn test_sent_requires_provider() {
        let mut e = entry(DeliveryStatus::Sent);
        assert!(!e.is_consistent());
        e.provider = Some(ProviderId::Brevo);
        assert!(e.is_consistent());
    }

    #[test]
    fn test_failed_requires_detail() {
        let mut e = entry(DeliveryStatus::Failed);
        assert!(!e.is_consistent());
        e.error_detail = Some("all providers exhausted or failing".into());
        assert!(e.is_consistent());
        assert!(e.is_replayable());
    }

    #[test]
    fn test_only_failed_is_replayable() {
        assert!(!entry(DeliveryStatus::Pending).is_replayable());
        assert!(!entry(DeliveryStatus::Sent).is_replayable());
    }
}
