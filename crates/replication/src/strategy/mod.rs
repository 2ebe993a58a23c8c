//! Replication strategy abstractions.
//!
//! Replication strategies determine how many copies of a key exist and on
//! which nodes they live.

pub mod simple;

pub use simple::SimpleStrategy;

use corelib::node::Node;
use corelib::ring::HashRing;

/// Trait for replication strategies.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) as they are shared by
/// every connection handler of a node.
pub trait ReplicationStrategy: Send + Sync + 'static {
    /// Number of copies, owner included.
    fn replication_factor(&self) -> usize;

    /// Nodes holding `key`, owner first. Empty for an empty ring.
    fn replicas_for_key(&self, ring: &HashRing, key: &[u8]) -> Vec<Node>;
}
