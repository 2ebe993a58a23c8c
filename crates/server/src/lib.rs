//! A storage node of the partitioned key-value store.
//!
//! This crate provides:
//! - The node state machine (ACTIVE, STOPPED, WRITE_LOCKED)
//! - Ownership-checked request routing over the local ring copy
//! - Membership changes with key migration
//! - The per-connection dispatcher and the TCP accept loop

pub mod config;
pub mod dispatch;
pub mod error;
pub mod log_level;
pub mod node;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use log_level::LogLevelControl;
pub use node::KvNode;
pub use server::KvServer;
pub use state::NodeStatus;
