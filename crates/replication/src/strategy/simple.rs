//! Simple replication strategy.
//!
//! Places copies on consecutive ring positions, clockwise from the owner.
//!
//! # Algorithm
//!
//! 1. Find the owner (ceiling of the key's token, wrapping)
//! 2. Step to the next position `N - 1` times, wrapping past the end
//! 3. Return the nodes visited, owner first
//!
//! Positions are not deduplicated: on a ring with fewer than `N` members the
//! walk comes back around and the list repeats nodes, the owner included.
//!
//! # Performance
//!
//! - **Time**: O(N * log n) where n = ring members
//! - **Space**: O(N)

use crate::strategy::ReplicationStrategy;
use corelib::node::Node;
use corelib::ring::HashRing;

/// Owner plus the next `replication_factor - 1` ring positions.
#[derive(Debug, Clone)]
pub struct SimpleStrategy {
    /// Number of copies, owner included.
    replication_factor: usize,
}

impl SimpleStrategy {
    pub fn new(replication_factor: usize) -> Self {
        Self { replication_factor }
    }
}

impl Default for SimpleStrategy {
    /// Owner and two replicas.
    fn default() -> Self {
        Self::new(3)
    }
}

impl ReplicationStrategy for SimpleStrategy {
    fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    fn replicas_for_key(&self, ring: &HashRing, key: &[u8]) -> Vec<Node> {
        if self.replication_factor == 0 {
            return Vec::new();
        }
        let Some(owner) = ring.owner(key) else {
            return Vec::new();
        };

        let mut replicas = Vec::with_capacity(self.replication_factor);
        replicas.push(owner.clone());
        while replicas.len() < self.replication_factor {
            let last = &replicas[replicas.len() - 1];
            match ring.successor(last) {
                Some(next) => {
                    let next = next.clone();
                    replicas.push(next);
                }
                None => break,
            }
        }
        replicas
    }
}
