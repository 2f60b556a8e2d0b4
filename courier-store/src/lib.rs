// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Courier Store
//!
//! Persistence and read models for Courier.
//!
//! This crate provides:
//!
//! - **SqliteStore**: Quota ledger, delivery log and stats read model on SQLite
//! - **StatsAggregator**: Today/week/month/chart/recent/health views
//! - **Config**: JSON configuration with environment overlays
//! - **JsonAccountDirectory**: Account lookup used by replays
//! - **Persistence**: Default paths and owner-only JSON file I/O
//!
//! ## Usage
//!
//! ```ignore
//! use courier_store::{Config, SqliteStore, StatsAggregator};
//!
//! let config = Config::load_from(&Config::default_path()).await?;
//! let store = SqliteStore::open(&config.database_path())?;
//!
//! let stats = StatsAggregator::new(Arc::new(store.clone()), providers, clock);
//! let today = stats.today().await?;
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod persistence;
pub mod schema;
pub mod sqlite;
pub mod stats;

pub use config::{Config, LinkConfig, RelayConfig, RetentionConfig, SenderConfig};
pub use directory::{AccountRecord, AccountsFile, JsonAccountDirectory};
pub use error::StoreError;
pub use persistence::{
    default_accounts_path, default_config_dir, default_config_path, default_data_dir,
    default_database_path, ensure_dir, load_json, load_json_or_default, save_json,
};
pub use sqlite::SqliteStore;
pub use stats::{DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT, StatsAggregator};
