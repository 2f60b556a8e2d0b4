//! SQLite-backed quota ledger, delivery log and stats read model.
//!
//! A single connection sits behind a mutex; every call runs on the blocking
//! pool so async callers never stall the runtime on disk I/O. Holding the
//! mutex for the whole statement is what serializes racing reservations.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use courier_core::{
    AttemptOutcome, CoreError, DeliveryLog, DeliveryLogEntry, DeliveryStatus, HourlyHistogram,
    MessageType, ProviderId, QuotaCounter, QuotaLedger, RangeTotals, Recipient, StatsReadModel,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::schema::init_schema;

// ============================================================================
// Store
// ============================================================================

/// SQLite persistence for the dispatcher.
///
/// Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;

        info!(path = %path.display(), "Opened delivery database");
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    // ========================================================================
    // Quota Ledger
    // ========================================================================

    /// Atomically reserves one attempt slot.
    pub async fn reserve_slot(
        &self,
        provider: ProviderId,
        date: NaiveDate,
        daily_quota: u32,
    ) -> Result<bool, StoreError> {
        let day = day_key(date);
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO quota_counters (provider, day) VALUES (?1, ?2)",
                params![provider.as_str(), day],
            )?;
            let changed = tx.execute(
                "UPDATE quota_counters SET reserved = reserved + 1
                 WHERE provider = ?1 AND day = ?2 AND attempted + reserved < ?3",
                params![provider.as_str(), day, daily_quota],
            )?;
            tx.commit()?;
            Ok(changed == 1)
        })
        .await
    }

    /// Moves one reserved slot into `attempted` and the outcome column, and
    /// counts the attempt in its UTC hour.
    pub async fn record_attempt(
        &self,
        provider: ProviderId,
        date: NaiveDate,
        hour: u32,
        outcome: AttemptOutcome,
    ) -> Result<(), StoreError> {
        let day = day_key(date);
        let (succeeded, failed) = match outcome {
            AttemptOutcome::Success => (1, 0),
            AttemptOutcome::Failure => (0, 1),
        };
        let hour = hour.min(23);
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE quota_counters
                 SET reserved = reserved - 1,
                     attempted = attempted + 1,
                     succeeded = succeeded + ?3,
                     failed = failed + ?4
                 WHERE provider = ?1 AND day = ?2 AND reserved > 0",
                params![provider.as_str(), day, succeeded, failed],
            )?;
            if changed == 0 {
                return Err(StoreError::NoReservation {
                    provider: provider.to_string(),
                    day,
                });
            }
            tx.execute(
                "INSERT INTO hourly_attempts (provider, day, hour, attempted)
                 VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT (provider, day, hour) DO UPDATE SET attempted = attempted + 1",
                params![provider.as_str(), day, hour],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Returns one reserved slot without counting an attempt.
    pub async fn release_slot(&self, provider: ProviderId, date: NaiveDate) -> Result<(), StoreError> {
        let day = day_key(date);
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE quota_counters SET reserved = reserved - 1
                 WHERE provider = ?1 AND day = ?2 AND reserved > 0",
                params![provider.as_str(), day],
            )?;
            if changed == 0 {
                return Err(StoreError::NoReservation {
                    provider: provider.to_string(),
                    day,
                });
            }
            debug!(provider = %provider, day, "Released quota reservation");
            Ok(())
        })
        .await
    }

    /// Reads a counter, zero when absent.
    pub async fn counter(
        &self,
        provider: ProviderId,
        date: NaiveDate,
    ) -> Result<QuotaCounter, StoreError> {
        let day = day_key(date);
        self.with_conn(move |conn| {
            let raw = conn
                .query_row(
                    "SELECT provider, day, attempted, succeeded, failed, reserved
                     FROM quota_counters WHERE provider = ?1 AND day = ?2",
                    params![provider.as_str(), day],
                    RawCounter::from_row,
                )
                .optional()?;
            match raw {
                Some(raw) => raw.into_counter(),
                None => Ok(QuotaCounter::zero(provider, date)),
            }
        })
        .await
    }

    // ========================================================================
    // Delivery Log
    // ========================================================================

    /// Inserts a pending entry.
    pub async fn insert_pending(
        &self,
        recipient: &Recipient,
        message_type: &MessageType,
        created_at: DateTime<Utc>,
    ) -> Result<DeliveryLogEntry, StoreError> {
        let recipient = recipient.clone();
        let message_type = message_type.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO delivery_log (recipient, message_type, status, created_at)
                 VALUES (?1, ?2, 'pending', ?3)",
                params![
                    recipient.as_str(),
                    message_type.as_str(),
                    created_at.timestamp_millis()
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!(id, "Created pending delivery log entry");
            Ok(DeliveryLogEntry {
                id,
                recipient,
                message_type,
                provider: None,
                status: DeliveryStatus::Pending,
                error_detail: None,
                created_at: truncate_to_millis(created_at),
                completed_at: None,
            })
        })
        .await
    }

    /// Transitions a pending entry to a terminal status.
    pub async fn complete(
        &self,
        id: i64,
        status: DeliveryStatus,
        provider: Option<ProviderId>,
        detail: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE delivery_log
                 SET status = ?2, provider = ?3, error_detail = ?4, completed_at = ?5
                 WHERE id = ?1 AND status = 'pending'",
                params![
                    id,
                    status.as_str(),
                    provider.as_ref().map(ProviderId::as_str),
                    detail,
                    completed_at.timestamp_millis()
                ],
            )?;
            if changed == 1 {
                return Ok(());
            }

            let current: Option<String> = conn
                .query_row(
                    "SELECT status FROM delivery_log WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            match current {
                None => Err(StoreError::EntryNotFound(id)),
                Some(current) => Err(StoreError::InvalidTransition {
                    id,
                    current: parse_field(&current)?,
                    requested: status,
                }),
            }
        })
        .await
    }

    /// Fetches one entry.
    pub async fn entry(&self, id: i64) -> Result<Option<DeliveryLogEntry>, StoreError> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM delivery_log WHERE id = ?1"),
                [id],
                RawEntry::from_row,
            )
            .optional()?
            .map(RawEntry::into_entry)
            .transpose()
        })
        .await
    }

    /// Deletes entries created strictly before `cutoff`.
    ///
    /// Stored timestamps are whole milliseconds, so the cutoff is rounded up
    /// to the next millisecond when it carries a fraction of one.
    pub async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let cutoff = ceil_millis(cutoff);
        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM delivery_log WHERE created_at < ?1",
                [cutoff],
            )?;
            Ok(deleted as u64)
        })
        .await
    }

    // ========================================================================
    // Read Model
    // ========================================================================

    /// Every counter row with `from <= day <= to`, ordered by day.
    pub async fn counters_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<QuotaCounter>, StoreError> {
        let (from, to) = (day_key(from), day_key(to));
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT provider, day, attempted, succeeded, failed, reserved
                 FROM quota_counters WHERE day BETWEEN ?1 AND ?2
                 ORDER BY day, provider",
            )?;
            let rows = stmt.query_map(params![from, to], RawCounter::from_row)?;
            rows.map(|raw| raw?.into_counter()).collect()
        })
        .await
    }

    /// Summed counters per provider over `from..=to`.
    pub async fn totals_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RangeTotals>, StoreError> {
        let (from, to) = (day_key(from), day_key(to));
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT provider, SUM(attempted), SUM(succeeded), SUM(failed)
                 FROM quota_counters WHERE day BETWEEN ?1 AND ?2
                 GROUP BY provider ORDER BY provider",
            )?;
            let rows = stmt.query_map(params![from, to], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?;
            rows.map(|row| {
                let (provider, attempted, succeeded, failed) = row?;
                Ok(RangeTotals {
                    provider: parse_provider(&provider)?,
                    attempted: to_count(attempted),
                    succeeded: to_count(succeeded),
                    failed: to_count(failed),
                })
            })
            .collect()
        })
        .await
    }

    /// Attempts recorded on `date`, bucketed by UTC hour.
    pub async fn hourly(&self, date: NaiveDate) -> Result<HourlyHistogram, StoreError> {
        let day = day_key(date);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT hour, SUM(attempted) FROM hourly_attempts
                 WHERE day = ?1 GROUP BY hour",
            )?;
            let rows = stmt.query_map([day], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?;
            let mut histogram = HourlyHistogram::new();
            for row in rows {
                let (hour, count) = row?;
                if let Ok(hour) = u32::try_from(hour) {
                    histogram.add(hour, to_count(count));
                }
            }
            Ok(histogram)
        })
        .await
    }

    /// Most recent entries, newest first.
    pub async fn latest(&self, limit: usize) -> Result<Vec<DeliveryLogEntry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM delivery_log
                 ORDER BY created_at DESC, id DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map([limit], RawEntry::from_row)?;
            rows.map(|raw| raw?.into_entry()).collect()
        })
        .await
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

#[async_trait]
impl QuotaLedger for SqliteStore {
    #[instrument(skip(self), level = "debug")]
    async fn reserve(
        &self,
        provider: ProviderId,
        date: NaiveDate,
        daily_quota: u32,
    ) -> Result<bool, CoreError> {
        Ok(self.reserve_slot(provider, date, daily_quota).await?)
    }

    async fn record_outcome(
        &self,
        provider: ProviderId,
        date: NaiveDate,
        hour: u32,
        outcome: AttemptOutcome,
    ) -> Result<(), CoreError> {
        Ok(self.record_attempt(provider, date, hour, outcome).await?)
    }

    async fn release(&self, provider: ProviderId, date: NaiveDate) -> Result<(), CoreError> {
        Ok(self.release_slot(provider, date).await?)
    }

    async fn get(&self, provider: ProviderId, date: NaiveDate) -> Result<QuotaCounter, CoreError> {
        Ok(self.counter(provider, date).await?)
    }
}

#[async_trait]
impl DeliveryLog for SqliteStore {
    async fn create_pending(
        &self,
        recipient: &Recipient,
        message_type: &MessageType,
        created_at: DateTime<Utc>,
    ) -> Result<DeliveryLogEntry, CoreError> {
        Ok(self
            .insert_pending(recipient, message_type, created_at)
            .await?)
    }

    async fn mark_sent(
        &self,
        id: i64,
        provider: ProviderId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Ok(self
            .complete(id, DeliveryStatus::Sent, Some(provider), None, completed_at)
            .await?)
    }

    async fn mark_failed(
        &self,
        id: i64,
        provider: Option<ProviderId>,
        detail: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Ok(self
            .complete(
                id,
                DeliveryStatus::Failed,
                provider,
                Some(detail.to_string()),
                completed_at,
            )
            .await?)
    }

    async fn get(&self, id: i64) -> Result<Option<DeliveryLogEntry>, CoreError> {
        Ok(self.entry(id).await?)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, CoreError> {
        Ok(self.delete_before(cutoff).await?)
    }
}

#[async_trait]
impl StatsReadModel for SqliteStore {
    async fn counters_for_day(&self, date: NaiveDate) -> Result<Vec<QuotaCounter>, CoreError> {
        Ok(self.counters_between(date, date).await?)
    }

    async fn range_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RangeTotals>, CoreError> {
        Ok(self.totals_between(from, to).await?)
    }

    async fn daily_series(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<QuotaCounter>, CoreError> {
        Ok(self.counters_between(from, to).await?)
    }

    async fn hourly_attempts(&self, date: NaiveDate) -> Result<HourlyHistogram, CoreError> {
        Ok(self.hourly(date).await?)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<DeliveryLogEntry>, CoreError> {
        Ok(self.latest(limit).await?)
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

const ENTRY_COLUMNS: &str =
    "id, recipient, message_type, provider, status, error_detail, created_at, completed_at";

struct RawCounter {
    provider: String,
    day: String,
    attempted: i64,
    succeeded: i64,
    failed: i64,
    reserved: i64,
}

impl RawCounter {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            provider: row.get(0)?,
            day: row.get(1)?,
            attempted: row.get(2)?,
            succeeded: row.get(3)?,
            failed: row.get(4)?,
            reserved: row.get(5)?,
        })
    }

    fn into_counter(self) -> Result<QuotaCounter, StoreError> {
        Ok(QuotaCounter {
            provider: parse_provider(&self.provider)?,
            date: NaiveDate::from_str(&self.day)
                .map_err(|e| StoreError::Corrupt(format!("day {:?}: {e}", self.day)))?,
            attempted: to_count(self.attempted),
            succeeded: to_count(self.succeeded),
            failed: to_count(self.failed),
            reserved: to_count(self.reserved),
        })
    }
}

struct RawEntry {
    id: i64,
    recipient: String,
    message_type: String,
    provider: Option<String>,
    status: String,
    error_detail: Option<String>,
    created_at: i64,
    completed_at: Option<i64>,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            recipient: row.get(1)?,
            message_type: row.get(2)?,
            provider: row.get(3)?,
            status: row.get(4)?,
            error_detail: row.get(5)?,
            created_at: row.get(6)?,
            completed_at: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<DeliveryLogEntry, StoreError> {
        Ok(DeliveryLogEntry {
            id: self.id,
            recipient: Recipient::parse(&self.recipient)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            message_type: MessageType::parse(&self.message_type)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            provider: self.provider.as_deref().map(parse_provider).transpose()?,
            status: parse_field(&self.status)?,
            error_detail: self.error_detail,
            created_at: from_millis(self.created_at)?,
            completed_at: self.completed_at.map(from_millis).transpose()?,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Smallest whole millisecond not earlier than `at`.
fn ceil_millis(at: DateTime<Utc>) -> i64 {
    let millis = at.timestamp_millis();
    if at.timestamp_subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis.saturating_add(1)
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {millis} out of range")))
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn parse_provider(value: &str) -> Result<ProviderId, StoreError> {
    ProviderId::from_str(value).map_err(StoreError::Corrupt)
}

fn parse_field(value: &str) -> Result<DeliveryStatus, StoreError> {
    DeliveryStatus::from_str(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 20).unwrap()
    }

    fn recipient() -> Recipient {
        Recipient::parse("member@example.org").unwrap()
    }

    #[tokio::test]
    async fn test_absent_counter_is_zero() {
        let store = SqliteStore::open_in_memory().unwrap();
        let counter = store.counter(ProviderId::Mailgun, day()).await.unwrap();
        assert_eq!(counter, QuotaCounter::zero(ProviderId::Mailgun, day()));
    }

    #[tokio::test]
    async fn test_reserve_stops_at_quota() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.reserve_slot(ProviderId::Brevo, day(), 2).await.unwrap());
        assert!(store.reserve_slot(ProviderId::Brevo, day(), 2).await.unwrap());
        assert!(!store.reserve_slot(ProviderId::Brevo, day(), 2).await.unwrap());

        let counter = store.counter(ProviderId::Brevo, day()).await.unwrap();
        assert_eq!(counter.reserved, 2);
        assert_eq!(counter.attempted, 0);
        assert!(counter.is_consistent());
    }

    #[tokio::test]
    async fn test_record_moves_reservation_into_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.reserve_slot(ProviderId::Brevo, day(), 5).await.unwrap();
        store.reserve_slot(ProviderId::Brevo, day(), 5).await.unwrap();
        store
            .record_attempt(ProviderId::Brevo, day(), 9, AttemptOutcome::Success)
            .await
            .unwrap();
        store
            .record_attempt(ProviderId::Brevo, day(), 9, AttemptOutcome::Failure)
            .await
            .unwrap();

        let counter = store.counter(ProviderId::Brevo, day()).await.unwrap();
        assert_eq!(
            (counter.attempted, counter.succeeded, counter.failed, counter.reserved),
            (2, 1, 1, 0)
        );
    }

    #[tokio::test]
    async fn test_record_without_reservation_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .record_attempt(ProviderId::SendGrid, day(), 9, AttemptOutcome::Success)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoReservation { .. }));
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.reserve_slot(ProviderId::Brevo, day(), 1).await.unwrap());
        assert!(!store.reserve_slot(ProviderId::Brevo, day(), 1).await.unwrap());
        let tomorrow = day().succ_opt().unwrap();
        assert!(store.reserve_slot(ProviderId::Brevo, tomorrow, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_lifecycle() {
        let store = SqliteStore::open_in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 4, 20, 8, 15, 0).unwrap();
        let entry = store
            .insert_pending(&recipient(), &MessageType::Verification, at)
            .await
            .unwrap();
        assert_eq!(entry.status, DeliveryStatus::Pending);

        store
            .complete(
                entry.id,
                DeliveryStatus::Sent,
                Some(ProviderId::Brevo),
                None,
                at + Duration::seconds(2),
            )
            .await
            .unwrap();

        let stored = store.entry(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Sent);
        assert_eq!(stored.provider, Some(ProviderId::Brevo));
        assert_eq!(stored.created_at, at);
        assert_eq!(stored.completed_at, Some(at + Duration::seconds(2)));
        assert!(stored.is_consistent());
    }

    #[tokio::test]
    async fn test_terminal_entry_cannot_transition() {
        let store = SqliteStore::open_in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 4, 20, 8, 15, 0).unwrap();
        let entry = store
            .insert_pending(&recipient(), &MessageType::PasswordReset, at)
            .await
            .unwrap();
        store
            .complete(entry.id, DeliveryStatus::Failed, None, Some("down".into()), at)
            .await
            .unwrap();

        let err = store
            .complete(entry.id, DeliveryStatus::Sent, Some(ProviderId::Brevo), None, at)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                current: DeliveryStatus::Failed,
                requested: DeliveryStatus::Sent,
                ..
            }
        ));

        let err = store
            .complete(404, DeliveryStatus::Sent, None, None, at)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EntryNotFound(404)));
    }

    #[tokio::test]
    async fn test_hourly_histogram_counts_attempts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let yesterday = day().pred_opt().unwrap();
        let attempts = [
            (ProviderId::Brevo, day(), 0, AttemptOutcome::Success),
            (ProviderId::Brevo, day(), 13, AttemptOutcome::Failure),
            (ProviderId::SendGrid, day(), 13, AttemptOutcome::Success),
            (ProviderId::Brevo, yesterday, 23, AttemptOutcome::Success),
        ];
        for (provider, date, hour, outcome) in attempts {
            assert!(store.reserve_slot(provider, date, 10).await.unwrap());
            store.record_attempt(provider, date, hour, outcome).await.unwrap();
        }

        // A dispatch that never reached a relay adds nothing.
        store
            .insert_pending(
                &recipient(),
                &MessageType::Verification,
                Utc.with_ymd_and_hms(2026, 4, 20, 5, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        let histogram = store.hourly(day()).await.unwrap();
        assert_eq!(histogram.get(0), 1);
        assert_eq!(histogram.get(13), 2);
        assert_eq!(histogram.get(5), 0);
        assert_eq!(histogram.total(), 3);
    }

    #[tokio::test]
    async fn test_release_returns_slot() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.reserve_slot(ProviderId::Brevo, day(), 1).await.unwrap());
        assert!(!store.reserve_slot(ProviderId::Brevo, day(), 1).await.unwrap());

        store.release_slot(ProviderId::Brevo, day()).await.unwrap();

        let counter = store.counter(ProviderId::Brevo, day()).await.unwrap();
        assert_eq!((counter.attempted, counter.reserved), (0, 0));
        assert!(store.reserve_slot(ProviderId::Brevo, day(), 1).await.unwrap());

        store.release_slot(ProviderId::Brevo, day()).await.unwrap();
        let err = store.release_slot(ProviderId::Brevo, day()).await.unwrap_err();
        assert!(matches!(err, StoreError::NoReservation { .. }));
    }

    #[tokio::test]
    async fn test_delete_before_sub_millisecond_cutoff() {
        let store = SqliteStore::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 4, 20, 8, 0, 0).unwrap();
        let older = base + Duration::microseconds(200);
        let cutoff = base + Duration::microseconds(500);

        store
            .insert_pending(&recipient(), &MessageType::Verification, older)
            .await
            .unwrap();
        let kept = store
            .insert_pending(
                &recipient(),
                &MessageType::Verification,
                base + Duration::milliseconds(1),
            )
            .await
            .unwrap();

        assert_eq!(store.delete_before(cutoff).await.unwrap(), 1);
        assert!(store.entry(kept.id).await.unwrap().is_some());

        // A whole-millisecond cutoff keeps an entry created exactly at it.
        assert_eq!(
            store.delete_before(base + Duration::milliseconds(1)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_latest_is_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 4, 20, 9, 0, 0).unwrap();
        for minutes in [0, 10, 5] {
            store
                .insert_pending(
                    &recipient(),
                    &MessageType::Verification,
                    base + Duration::minutes(minutes),
                )
                .await
                .unwrap();
        }
        let latest = store.latest(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].created_at, base + Duration::minutes(10));
        assert_eq!(latest[1].created_at, base + Duration::minutes(5));
    }
}
