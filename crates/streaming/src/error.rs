//! Error types for the wire protocol.

use thiserror::Error;

/// Result type alias for the streaming crate.
pub type Result<T> = std::result::Result<T, StreamingError>;

#[derive(Debug, Error)]
pub enum StreamingError {
    /// The bytes on the wire are not a well-formed message.
    #[error("malformed message: {0}")]
    Format(String),

    /// A well-formed message breaks the rules for its header.
    #[error("invalid message: {0}")]
    Validation(String),

    #[error("frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out talking to {0}")]
    Timeout(String),

    #[error("connection closed by {0}")]
    Closed(String),

    #[error("connection to {peer} rejected: {reason}")]
    Rejected { peer: String, reason: String },
}
