//! Replication and data movement between nodes.
//!
//! This crate provides:
//! - Replica placement ([`strategy`]): which nodes hold copies of a key
//! - Replication pushes ([`replicator`]): best-effort copies of every owner
//!   write to the replicas
//! - Migration ([`migration`]): moving keys to a node that takes over part of
//!   the ring
//! - Peer health probes ([`health`]) with bounded retries

pub mod error;
pub mod health;
pub mod migration;
pub mod replicator;
pub mod strategy;

pub use error::{ReplicationError, Result};
pub use health::ProbePolicy;
pub use migration::{MigrationReport, Migrator};
pub use replicator::{PushOutcome, Replicator};
pub use strategy::{ReplicationStrategy, SimpleStrategy};
