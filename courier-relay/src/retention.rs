//! Retention sweeps over the delivery log.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::Duration;
use courier_core::{Clock, CoreError, DeliveryLog, ValidationError};
use tracing::{info, instrument};

use crate::error::RelayError;

/// Shortest horizon accepted by default, in days.
pub const DEFAULT_MIN_RETENTION_DAYS: u32 = 7;

/// Longest horizon accepted by default, in days.
pub const DEFAULT_MAX_RETENTION_DAYS: u32 = 90;

/// Accepted range for a purge horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionBounds {
    min_days: u32,
    max_days: u32,
}

impl RetentionBounds {
    /// Creates bounds; `min_days` must be at least 1 and not above `max_days`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` for an empty or zero-based range.
    pub fn new(min_days: u32, max_days: u32) -> Result<Self, CoreError> {
        if min_days == 0 || min_days > max_days {
            return Err(CoreError::InvalidConfig(format!(
                "retention bounds {min_days}..={max_days} are invalid"
            )));
        }
        Ok(Self { min_days, max_days })
    }

    /// Accepted range.
    pub fn range(&self) -> RangeInclusive<u32> {
        self.min_days..=self.max_days
    }

    /// Rejects horizons outside the range.
    pub fn check(&self, days: u32) -> Result<(), ValidationError> {
        if self.range().contains(&days) {
            Ok(())
        } else {
            Err(ValidationError::HorizonOutOfRange {
                days,
                min: self.min_days,
                max: self.max_days,
            })
        }
    }
}

impl Default for RetentionBounds {
    fn default() -> Self {
        Self {
            min_days: DEFAULT_MIN_RETENTION_DAYS,
            max_days: DEFAULT_MAX_RETENTION_DAYS,
        }
    }
}

/// Deletes delivery log entries past a horizon. Never touches quota counters.
pub struct RetentionSweeper {
    log: Arc<dyn DeliveryLog>,
    clock: Arc<dyn Clock>,
    bounds: RetentionBounds,
}

impl RetentionSweeper {
    /// Creates a sweeper with the given bounds.
    pub fn new(log: Arc<dyn DeliveryLog>, clock: Arc<dyn Clock>, bounds: RetentionBounds) -> Self {
        Self { log, clock, bounds }
    }

    /// Accepted horizon range.
    pub fn bounds(&self) -> RetentionBounds {
        self.bounds
    }

    /// Deletes every entry created strictly before `now - older_than_days`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Validation`] before deleting anything when the
    /// horizon is out of range.
    #[instrument(skip(self))]
    pub async fn purge(&self, older_than_days: u32) -> Result<u64, RelayError> {
        self.bounds.check(older_than_days)?;

        let cutoff = self.clock.now() - Duration::days(i64::from(older_than_days));
        let deleted = self.log.purge_before(cutoff).await?;

        info!(older_than_days, %cutoff, deleted, "Purged delivery log");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let bounds = RetentionBounds::default();
        assert!(bounds.check(7).is_ok());
        assert!(bounds.check(90).is_ok());
        assert_eq!(
            bounds.check(6),
            Err(ValidationError::HorizonOutOfRange {
                days: 6,
                min: 7,
                max: 90
            })
        );
        assert!(bounds.check(91).is_err());
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(RetentionBounds::new(0, 10).is_err());
        assert!(RetentionBounds::new(30, 10).is_err());
        assert_eq!(RetentionBounds::new(1, 1).unwrap().range(), 1..=1);
    }
}
