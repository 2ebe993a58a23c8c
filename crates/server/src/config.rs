//! Node configuration.

use corelib::node::{Node, NodeId};
use replication::ProbePolicy;
use std::path::PathBuf;
use std::time::Duration;
use storage::CacheStrategy;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on; also this node's address on the ring.
    pub address: String,
    /// 0 picks a free port at bind time.
    pub port: u16,
    pub id: NodeId,
    pub cache_capacity: usize,
    pub strategy: CacheStrategy,
    /// Directory holding the durable log.
    pub data_dir: PathBuf,
    /// Serialized ring to start from. Without one the node owns the whole
    /// ring by itself.
    pub metadata: Option<String>,
    /// Begin ACTIVE instead of STOPPED.
    pub start_active: bool,
    /// Connect/response timeout for replication and migration.
    pub peer_timeout: Duration,
    pub probe: ProbePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5000,
            id: NodeId(0),
            cache_capacity: 100,
            strategy: CacheStrategy::Fifo,
            data_dir: PathBuf::from("data"),
            metadata: None,
            start_active: false,
            peer_timeout: Duration::from_secs(1),
            probe: ProbePolicy::default(),
        }
    }
}

impl ServerConfig {
    /// This node's descriptor, listening on `port`.
    pub fn node(&self, port: u16) -> Node {
        Node::new(self.id, self.address.clone(), port)
    }

    /// `<data_dir>/<address>_<port>.db`
    pub fn db_path(&self, port: u16) -> PathBuf {
        self.data_dir.join(format!("{}_{}.db", self.address, port))
    }
}
