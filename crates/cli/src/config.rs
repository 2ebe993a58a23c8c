//! Command-line configuration.

use anyhow::Context;
use clap::Parser;
use corelib::node::NodeId;
use server::{KvServer, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use storage::CacheStrategy;
use streaming::LogLevel;
use tracing::info;

use crate::telemetry;

#[derive(Parser, Debug)]
#[command(name = "kvnode", version, about = "Run one node of the partitioned key-value store")]
pub struct CliConfig {
    /// Address to listen on and to advertise on the ring
    #[arg(long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Node id used on the ring
    #[arg(long, default_value_t = 0)]
    pub id: u32,

    /// Cache capacity in entries; 0 disables caching
    #[arg(long, default_value_t = 100)]
    pub cache_size: usize,

    /// Cache eviction strategy: FIFO, LRU or LFU
    #[arg(long, default_value = "FIFO")]
    pub strategy: CacheStrategy,

    /// Directory for the durable log
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "INFO")]
    pub log_level: LogLevel,

    /// Serialized ring to start from
    #[arg(long)]
    pub metadata: Option<String>,

    /// Serve client traffic right away instead of waiting for `start`
    #[arg(long)]
    pub start: bool,
}

impl CliConfig {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            address: self.address.clone(),
            port: self.port,
            id: NodeId(self.id),
            cache_capacity: self.cache_size,
            strategy: self.strategy,
            data_dir: self.data_dir.clone(),
            metadata: self.metadata.clone(),
            start_active: self.start,
            ..Default::default()
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let levels = telemetry::init(self.log_level)?;
        let runtime = tokio::runtime::Runtime::new().context("building runtime")?;

        runtime.block_on(async {
            let server = KvServer::bind(self.server_config())
                .await
                .with_context(|| format!("binding {}:{}", self.address, self.port))?;
            server.node().install_log_control(Arc::new(levels));
            info!(addr = %server.local_addr()?, "listening");
            server.run().await?;
            Ok::<_, anyhow::Error>(())
        })
    }
}
