//! SQLite schema for the quota ledger and delivery log.
//!
//! Days are stored as ISO `YYYY-MM-DD` text so range queries compare
//! lexically; timestamps are UTC milliseconds since the epoch.

use rusqlite::Connection;

use crate::error::StoreError;

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema.
///
/// Creates all tables if they don't exist and refuses databases written by a
/// newer build.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_schema_version(conn)?;

    if current_version < SCHEMA_VERSION {
        // Every table is created with IF NOT EXISTS, so a version 1 database
        // only gains the hourly attempt table.
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: current_version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(())
}

/// Get the current schema version (0 if not initialized).
pub fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r"
        -- Per-provider, per-day counters
        CREATE TABLE IF NOT EXISTS quota_counters (
            provider TEXT NOT NULL,
            day TEXT NOT NULL,
            attempted INTEGER NOT NULL DEFAULT 0,
            succeeded INTEGER NOT NULL DEFAULT 0,
            failed INTEGER NOT NULL DEFAULT 0,
            reserved INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (provider, day),
            CHECK (attempted = succeeded + failed),
            CHECK (reserved >= 0)
        );

        -- Attempts per provider, day and UTC hour (since version 2)
        CREATE TABLE IF NOT EXISTS hourly_attempts (
            provider TEXT NOT NULL,
            day TEXT NOT NULL,
            hour INTEGER NOT NULL CHECK (hour BETWEEN 0 AND 23),
            attempted INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (provider, day, hour)
        );

        -- One row per dispatch
        CREATE TABLE IF NOT EXISTS delivery_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient TEXT NOT NULL,
            message_type TEXT NOT NULL,
            provider TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'sent', 'failed')),
            error_detail TEXT,
            created_at INTEGER NOT NULL,
            completed_at INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_quota_counters_day ON quota_counters(day);
        CREATE INDEX IF NOT EXISTS idx_delivery_log_created ON delivery_log(created_at);
        CREATE INDEX IF NOT EXISTS idx_delivery_log_status ON delivery_log(status);
        ",
    )?;

    Ok(())
}
