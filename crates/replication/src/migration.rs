//! Key migration after a ring change.
//!
//! When a node joins, or this node leaves, some keys in the local log belong
//! to a different node under the new ring. Those keys are copied to the new
//! owner one at a time, each acknowledged before it is deleted locally.
//!
//! A failure midway stops the transfer. Keys moved before the failure stay
//! on the target and are gone locally; nothing is rolled back.

use crate::error::{ReplicationError, Result};
use crate::health::{probe, ProbePolicy};
use corelib::node::Node;
use corelib::ring::HashRing;
use metrics::counter;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use storage::{StorageEngine, TOMBSTONE};
use streaming::{Connection, Message};
use tracing::{debug, info, warn};

/// Entries from `entries` that `ring` assigns to `target`.
pub fn plan(
    ring: &HashRing,
    entries: &BTreeMap<String, String>,
    target: &Node,
) -> Vec<(String, String)> {
    entries
        .iter()
        .filter(|(key, _)| ring.owner(key.as_bytes()) == Some(target))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub target: Node,
    pub moved: usize,
}

pub struct Migrator {
    timeout: Duration,
    probe: ProbePolicy,
}

impl Migrator {
    pub fn new(timeout: Duration, probe: ProbePolicy) -> Self {
        Self { timeout, probe }
    }

    /// Move every local key that `ring` assigns to `target`.
    ///
    /// `ring` must already reflect the membership change.
    pub async fn transfer(
        &self,
        engine: &Arc<StorageEngine>,
        ring: &HashRing,
        target: &Node,
    ) -> Result<MigrationReport> {
        let entries = engine.blocking(|e| e.entries()).await?;
        let batch = plan(ring, &entries, target);
        if batch.is_empty() {
            debug!(target = %target, "nothing to migrate");
            return Ok(MigrationReport {
                target: target.clone(),
                moved: 0,
            });
        }

        let endpoint = target.endpoint();
        probe(&endpoint, &self.probe).await?;

        let mut conn = Connection::open(&endpoint, self.timeout).await?;
        let mut moved = 0;
        for (key, value) in &batch {
            let reply = conn.request(&Message::admin_put(key.as_str(), value.as_str())).await?;
            if !reply.is_success() {
                warn!(target = %target, key = %key, moved, "migration refused");
                return Err(ReplicationError::Refused {
                    peer: endpoint,
                    key: key.clone(),
                    status: reply
                        .status
                        .map_or_else(|| "no status".to_string(), |s| s.to_string()),
                });
            }
            let local = key.clone();
            engine.blocking(move |e| e.put(&local, TOMBSTONE)).await?;
            counter!("kv_migrated_keys_total").increment(1);
            moved += 1;
        }

        info!(target = %target, moved, "migration complete");
        Ok(MigrationReport {
            target: target.clone(),
            moved,
        })
    }
}
