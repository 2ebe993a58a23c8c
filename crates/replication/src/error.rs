//! Error types for replication and migration.

use streaming::StreamingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplicationError>;

#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error("transport error: {0}")]
    Transport(#[from] StreamingError),

    #[error("local storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// The peer answered, but not with a success status.
    #[error("{peer} refused {key:?}: {status}")]
    Refused {
        peer: String,
        key: String,
        status: String,
    },

    #[error("{peer} unreachable after {attempts} attempts")]
    Unreachable { peer: String, attempts: usize },
}
