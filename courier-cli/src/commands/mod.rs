//! CLI command implementations.

pub mod config;
pub mod providers;
pub mod purge;
pub mod replay;
pub mod send;
pub mod stats;
