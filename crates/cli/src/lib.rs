//! `kvnode`: runs one storage node of the partitioned key-value store.
//!
//! Provides:
//! - Command-line configuration
//! - Logging setup with a runtime-adjustable level

pub mod config;
pub mod telemetry;

pub use config::CliConfig;
pub use telemetry::LevelHandle;
