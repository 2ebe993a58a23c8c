//! Error types for the storage engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("durable log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Keys and values are stored one per line.
    #[error("entry cannot contain a line break: {0:?}")]
    InvalidEntry(String),

    #[error("unknown cache strategy {0:?} (expected FIFO, LRU or LFU)")]
    UnknownStrategy(String),
}
