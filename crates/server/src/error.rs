//! Error types for the node.

use corelib::node::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("migration failed: {0}")]
    Migration(#[from] replication::ReplicationError),

    #[error(transparent)]
    Ring(#[from] corelib::Error),

    #[error("transport error: {0}")]
    Transport(#[from] streaming::StreamingError),

    /// `addNode` named an id that is neither in the ring nor given an endpoint.
    #[error("node {0} is not in the ring")]
    UnknownNode(NodeId),

    #[error("cannot change log level: {0}")]
    LogLevel(String),
}
