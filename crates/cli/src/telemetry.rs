//! Logging setup.
//!
//! The level filter sits behind a reload layer so a `logLevel` message can
//! change verbosity without restarting the node.

use server::{LogLevelControl, ServerError};
use streaming::LogLevel;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

/// `tracing` has no ALL or FATAL; they map to the nearest level.
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::All | LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

pub struct LevelHandle(reload::Handle<LevelFilter, Registry>);

/// Install the global subscriber at `level`.
pub fn init(level: LogLevel) -> anyhow::Result<LevelHandle> {
    let (filter, handle) = reload::Layer::new(level_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;
    Ok(LevelHandle(handle))
}

impl LogLevelControl for LevelHandle {
    fn set_level(&self, level: LogLevel) -> server::Result<()> {
        self.0
            .reload(level_filter(level))
            .map_err(|e| ServerError::LogLevel(e.to_string()))?;
        tracing::info!(%level, "log level changed");
        Ok(())
    }
}
