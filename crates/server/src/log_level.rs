use crate::error::Result;
use streaming::LogLevel;

/// Runtime control over the process log level, driven by `logLevel`.
///
/// The binary owns the subscriber and installs an implementation on the
/// node. Without one, `logLevel` requests fail.
pub trait LogLevelControl: Send + Sync {
    fn set_level(&self, level: LogLevel) -> Result<()>;
}
