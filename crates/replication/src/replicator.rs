//! Replication pushes.
//!
//! After an owner accepts a client write it copies the same key/value to the
//! replicas with `admin_put`, which skips the replicas' state and ownership
//! checks. Each push is a single attempt; failures are reported, never
//! retried, and never undo the owner's write.

use crate::error::{ReplicationError, Result};
use crate::strategy::{ReplicationStrategy, SimpleStrategy};
use corelib::node::Node;
use corelib::ring::HashRing;
use metrics::counter;
use std::time::Duration;
use streaming::{Connection, Message, Status};
use tracing::{debug, warn};

/// Result of pushing one write to one replica.
#[derive(Debug)]
pub struct PushOutcome {
    pub replica: Node,
    pub result: Result<Status>,
}

impl PushOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct Replicator<S = SimpleStrategy> {
    strategy: S,
    timeout: Duration,
}

impl Replicator<SimpleStrategy> {
    /// Owner plus two replicas.
    pub fn new(timeout: Duration) -> Self {
        Self::with_strategy(SimpleStrategy::default(), timeout)
    }
}

impl<S: ReplicationStrategy> Replicator<S> {
    pub fn with_strategy(strategy: S, timeout: Duration) -> Self {
        Self { strategy, timeout }
    }

    /// Replica holders for `key`, owner excluded.
    pub fn targets(&self, ring: &HashRing, key: &str) -> Vec<Node> {
        self.strategy
            .replicas_for_key(ring, key.as_bytes())
            .into_iter()
            .skip(1)
            .collect()
    }

    /// Push `key`/`value` to every target independently.
    pub async fn replicate(&self, targets: &[Node], key: &str, value: &str) -> Vec<PushOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for replica in targets {
            let result = push(&replica.endpoint(), key, value, self.timeout).await;
            match &result {
                Ok(status) => debug!(replica = %replica, key, %status, "replicated"),
                Err(e) => {
                    counter!("kv_replication_failures_total").increment(1);
                    warn!(replica = %replica, key, error = %e, "replication push failed");
                }
            }
            outcomes.push(PushOutcome {
                replica: replica.clone(),
                result,
            });
        }
        outcomes
    }
}

/// Send one `admin_put` to `endpoint` and require a success status.
pub async fn push(endpoint: &str, key: &str, value: &str, timeout: Duration) -> Result<Status> {
    let mut conn = Connection::open(endpoint, timeout).await?;
    let reply = conn.request(&Message::admin_put(key, value)).await?;
    match reply.status {
        Some(status) if status.is_success() => Ok(status),
        other => Err(ReplicationError::Refused {
            peer: endpoint.to_string(),
            key: key.to_string(),
            status: other.map_or_else(|| "no status".to_string(), |s| s.to_string()),
        }),
    }
}
