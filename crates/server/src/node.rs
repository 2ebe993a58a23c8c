//! Request handling for one node.
//!
//! `KvNode` owns everything a node knows: its own descriptor, its status,
//! its copy of the ring and its storage engine. Client requests are checked
//! against the status first and ring ownership second; admin requests skip
//! both.
//!
//! The ring and status locks are never held across an `.await`. Handlers
//! copy what they need out of them before talking to peers. The write gate
//! is the exception: a client put holds it shared until its local commit,
//! and a membership change holds it exclusively, so keys never land on a
//! node after the migration that should have moved them.
//!
//! Storage calls run on the blocking pool.

use crate::error::{Result, ServerError};
use crate::log_level::LogLevelControl;
use crate::state::NodeStatus;
use corelib::node::{Node, NodeId};
use corelib::ring::HashRing;
use metrics::counter;
use parking_lot::RwLock;
use replication::{MigrationReport, Migrator, Replicator};
use std::sync::Arc;
use storage::{PutOutcome, StorageEngine, TOMBSTONE};
use streaming::{LogLevel, Status};
use tokio::sync::RwLock as AsyncRwLock;
use tracing::{debug, error, info, warn};

/// Status and value of a reply.
pub type Response = (Status, String);

pub struct KvNode {
    me: Node,
    status: RwLock<NodeStatus>,
    ring: RwLock<HashRing>,
    storage: Arc<StorageEngine>,
    replicator: Replicator,
    migrator: Migrator,
    write_gate: AsyncRwLock<()>,
    log_control: RwLock<Option<Arc<dyn LogLevelControl>>>,
}

impl KvNode {
    pub fn new(
        me: Node,
        ring: HashRing,
        storage: StorageEngine,
        replicator: Replicator,
        migrator: Migrator,
        status: NodeStatus,
    ) -> Self {
        Self {
            me,
            status: RwLock::new(status),
            ring: RwLock::new(ring),
            storage: Arc::new(storage),
            replicator,
            migrator,
            write_gate: AsyncRwLock::new(()),
            log_control: RwLock::new(None),
        }
    }

    pub fn me(&self) -> &Node {
        &self.me
    }

    pub fn status(&self) -> NodeStatus {
        *self.status.read()
    }

    /// Snapshot of the local ring.
    pub fn ring(&self) -> HashRing {
        self.ring.read().clone()
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    pub fn install_log_control(&self, control: Arc<dyn LogLevelControl>) {
        *self.log_control.write() = Some(control);
    }

    pub fn start(&self) {
        self.set_status(NodeStatus::Active);
    }

    pub fn stop(&self) {
        self.set_status(NodeStatus::Stopped);
    }

    pub fn lock_write(&self) {
        self.set_status(NodeStatus::WriteLocked);
    }

    /// Leave WRITE_LOCKED for ACTIVE. Any other status is left alone.
    pub fn unlock_write(&self) {
        let mut status = self.status.write();
        if *status == NodeStatus::WriteLocked {
            *status = NodeStatus::Active;
        }
    }

    fn set_status(&self, next: NodeStatus) {
        let prev = std::mem::replace(&mut *self.status.write(), next);
        if prev != next {
            info!(node = %self.me, from = %prev, to = %next, "status changed");
        }
    }

    /// Client `get`: served by the owner and both replicas.
    pub async fn handle_get(&self, key: &str) -> Response {
        counter!("kv_get_total").increment(1);
        if !self.status().can_read() {
            return (Status::ServerStopped, String::new());
        }
        {
            let ring = self.ring.read();
            if !ring.can_serve(self.me.id, key.as_bytes()) {
                debug!(key, "get for a key this node does not hold");
                return (Status::ServerNotResponsible, ring.serialize());
            }
        }

        let owned = key.to_string();
        match self.storage.blocking(move |s| s.get(&owned)).await {
            Ok(Some(value)) => (Status::GetSuccess, value),
            Ok(None) => (Status::GetError, String::new()),
            Err(e) => {
                error!(key, error = %e, "get failed");
                (Status::GetError, e.to_string())
            }
        }
    }

    /// Client `put`: only the owner accepts it, and pushes it to the
    /// replicas before writing locally.
    pub async fn handle_put(&self, key: &str, value: &str) -> Response {
        counter!("kv_put_total").increment(1);
        let _gate = self.write_gate.read().await;
        match self.status() {
            NodeStatus::Stopped => return (Status::ServerStopped, String::new()),
            NodeStatus::WriteLocked => return (Status::ServerWriteLock, String::new()),
            NodeStatus::Active => {}
        }

        let targets = {
            let ring = self.ring.read();
            if ring.owner(key.as_bytes()) != Some(&self.me) {
                debug!(key, "put for a key this node does not own");
                return (Status::ServerNotResponsible, ring.serialize());
            }
            self.replicator.targets(&ring, key)
        };

        // Failures are logged by the replicator and do not block the write.
        self.replicator.replicate(&targets, key, value).await;
        self.store(key, value).await
    }

    /// Write without status or ownership checks. Used by replication pushes
    /// and migration transfers.
    pub async fn admin_put(&self, key: &str, value: &str) -> Response {
        self.store(key, value).await
    }

    async fn store(&self, key: &str, value: &str) -> Response {
        let (k, v) = (key.to_string(), value.to_string());
        match self.storage.blocking(move |s| s.put(&k, &v)).await {
            Ok(PutOutcome::Inserted) => (Status::PutSuccess, value.to_string()),
            Ok(PutOutcome::Updated) => (Status::PutUpdate, value.to_string()),
            Ok(PutOutcome::Deleted) => (Status::DeleteSuccess, String::new()),
            Err(e) => {
                error!(key, error = %e, "put failed");
                let status = if value == TOMBSTONE {
                    Status::DeleteError
                } else {
                    Status::PutError
                };
                (status, e.to_string())
            }
        }
    }

    /// Replace the local ring with the coordinator's serialized view.
    pub fn update_metadata(&self, serialized: &str) {
        let ring = HashRing::deserialize(serialized);
        info!(members = ring.len(), "ring replaced");
        *self.ring.write() = ring;
    }

    pub fn set_log_level(&self, level: LogLevel) -> Result<()> {
        let control = self.log_control.read().clone();
        match control {
            Some(control) => control.set_level(level),
            None => Err(ServerError::LogLevel("no log control installed".into())),
        }
    }

    /// Drop cached state, re-read the durable log and stop.
    pub async fn init(&self) -> Result<usize> {
        let entries = self.storage.blocking(|s| s.reload()).await?;
        self.stop();
        info!(node = %self.me, entries, "initialised");
        Ok(entries)
    }

    /// A node joined. `endpoint` is `"<address> <port>"`, or empty to look
    /// the node up by id in the current ring.
    ///
    /// Keys the new node now owns are moved to it. The ring change stays in
    /// effect if the transfer fails; the prior status is restored either way.
    pub async fn add_node(&self, id: NodeId, endpoint: &str) -> Result<MigrationReport> {
        let _gate = self.write_gate.write().await;
        let joining = if endpoint.trim().is_empty() {
            self.ring
                .read()
                .node_by_id(id)
                .cloned()
                .ok_or(ServerError::UnknownNode(id))?
        } else {
            Node::from_endpoint(id, endpoint)?
        };
        if joining.id == self.me.id {
            return Ok(MigrationReport {
                target: joining,
                moved: 0,
            });
        }

        info!(node = %self.me, joining = %joining, "adding node");
        self.migrate(joining, |ring, node| {
            ring.add_node(node.clone());
        })
        .await
    }

    /// This node leaves the ring and hands its keys to `successor`.
    pub async fn remove_node(&self, id: NodeId, endpoint: &str) -> Result<MigrationReport> {
        let _gate = self.write_gate.write().await;
        let successor = Node::from_endpoint(id, endpoint)?;
        if successor.id == self.me.id {
            return Ok(MigrationReport {
                target: successor,
                moved: 0,
            });
        }

        info!(node = %self.me, successor = %successor, "removing self from ring");
        let me = self.me.clone();
        self.migrate(successor, move |ring, _| {
            ring.remove_node(&me);
        })
        .await
    }

    /// Caller holds the write gate.
    async fn migrate<F>(&self, target: Node, change: F) -> Result<MigrationReport>
    where
        F: FnOnce(&mut HashRing, &Node),
    {
        let saved = self.status();
        self.lock_write();

        let ring = {
            let mut ring = self.ring.write();
            change(&mut *ring, &target);
            ring.clone()
        };
        let result = self.migrator.transfer(&self.storage, &ring, &target).await;

        self.set_status(saved);
        match result {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!(node = %self.me, target = %target, error = %e, "migration aborted");
                Err(e.into())
            }
        }
    }
}
