//! Derived provider health.
//!
//! This module contains the per-provider usage classification:
//! - [`HealthStatus`] - Classification levels
//! - [`ServiceHealth`] - Health row for one provider

use serde::{Deserialize, Serialize};

use super::provider::ProviderId;
use super::quota::QuotaCounter;

/// Usage percentage at which a provider is reported as `Warning`.
pub const WARNING_PERCENT: u64 = 80;

/// Usage percentage at which a provider is reported as `Exhausted`.
pub const EXHAUSTED_PERCENT: u64 = 100;

// ============================================================================
// Health Status
// ============================================================================

/// Classification of a provider's current-day usage relative to its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Credentials not configured.
    Inactive,
    /// Enabled, nothing sent today.
    #[default]
    Idle,
    /// Below the warning threshold.
    Active,
    /// At or above 80% of the quota.
    Warning,
    /// At or above 100% of the quota.
    Exhausted,
}

impl HealthStatus {
    /// Classifies a provider's usage.
    ///
    /// Thresholds are compared in integer arithmetic so that the 80% and
    /// 100% boundaries are exact for every quota.
    pub fn classify(enabled: bool, attempted: u64, daily_quota: u32) -> Self {
        if !enabled {
            return Self::Inactive;
        }
        let quota = u64::from(daily_quota);
        let scaled = attempted.saturating_mul(100);
        if scaled >= quota.saturating_mul(EXHAUSTED_PERCENT) {
            Self::Exhausted
        } else if scaled >= quota.saturating_mul(WARNING_PERCENT) {
            Self::Warning
        } else if attempted > 0 {
            Self::Active
        } else {
            Self::Idle
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Idle => "Idle",
            Self::Active => "Active",
            Self::Warning => "Warning",
            Self::Exhausted => "Exhausted",
        }
    }

    /// Returns an emoji for the status.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Inactive => "⚪",
            Self::Idle => "🔵",
            Self::Active => "🟢",
            Self::Warning => "🟡",
            Self::Exhausted => "🔴",
        }
    }

    /// Returns a severity score (0 = idle, 3 = exhausted).
    pub fn severity(&self) -> u8 {
        match self {
            Self::Idle | Self::Inactive => 0,
            Self::Active => 1,
            Self::Warning => 2,
            Self::Exhausted => 3,
        }
    }

    /// Returns all statuses.
    pub fn all() -> &'static [HealthStatus] {
        &[
            Self::Inactive,
            Self::Idle,
            Self::Active,
            Self::Warning,
            Self::Exhausted,
        ]
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

// ============================================================================
// Service Health
// ============================================================================

/// Health row for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Provider.
    pub provider: ProviderId,
    /// Whether its credentials are configured.
    pub enabled: bool,
    /// Attempts recorded today.
    pub today_usage: u64,
    /// Daily quota.
    pub daily_quota: u32,
    /// `today_usage / daily_quota * 100`.
    pub percentage: f64,
    /// Derived classification.
    pub status: HealthStatus,
}

impl ServiceHealth {
    /// Derives health from today's counter.
    pub fn from_counter(enabled: bool, daily_quota: u32, counter: &QuotaCounter) -> Self {
        Self {
            provider: counter.provider,
            enabled,
            today_usage: counter.attempted,
            daily_quota,
            percentage: counter.percentage(daily_quota),
            status: HealthStatus::classify(enabled, counter.attempted, daily_quota),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
