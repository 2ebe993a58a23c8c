//! Wire protocol spoken between clients, nodes and the cluster coordinator.
//!
//! This crate provides:
//! - The message model (header, status, key, value) and per-header
//!   validity rules
//! - The quoted, newline-terminated text codec
//! - A bounded frame reader for incoming byte streams
//! - An outbound connection that performs the connect handshake and
//!   request/response exchanges under a timeout

pub mod codec;
pub mod error;
pub mod protocol;
pub mod receiver;
pub mod sender;

pub use error::{Result, StreamingError};
pub use protocol::{Header, LogLevel, Message, Status};
pub use receiver::FrameReader;
pub use sender::Connection;
