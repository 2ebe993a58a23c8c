//! TCP front end: accept loop and per-connection handler.

use crate::config::ServerConfig;
use crate::dispatch::{dispatch, Action};
use crate::error::Result;
use crate::node::KvNode;
use crate::state::NodeStatus;
use corelib::ring::{HashRing, RingBuilder};
use metrics::counter;
use replication::{Migrator, Replicator};
use std::net::SocketAddr;
use std::sync::Arc;
use storage::StorageEngine;
use streaming::codec::{decode, encode};
use streaming::{FrameReader, Header, Message, Status, StreamingError};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

pub struct KvServer {
    listener: TcpListener,
    node: Arc<KvNode>,
    shutdown: Arc<Notify>,
}

impl KvServer {
    /// Bind the listener and open the node's storage.
    ///
    /// With port 0 the node's ring descriptor and log file use the port the
    /// OS picked.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
        let port = listener.local_addr()?.port();
        let me = config.node(port);

        let ring = match &config.metadata {
            Some(serialized) => HashRing::deserialize(serialized),
            None => RingBuilder::new().add_node(me.clone()).build(),
        };
        if !ring.contains(&me) {
            warn!(node = %me, "this node is not in its own ring");
        }

        let storage = StorageEngine::new(config.db_path(port), config.strategy, config.cache_capacity);
        let status = if config.start_active {
            NodeStatus::Active
        } else {
            NodeStatus::Stopped
        };
        let node = KvNode::new(
            me,
            ring,
            storage,
            Replicator::new(config.peer_timeout),
            Migrator::new(config.peer_timeout, config.probe),
            status,
        );

        info!(
            node = %node.me(),
            strategy = %config.strategy,
            capacity = config.cache_capacity,
            %status,
            "node bound"
        );
        Ok(Self {
            listener,
            node: Arc::new(node),
            shutdown: Arc::new(Notify::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn node(&self) -> Arc<KvNode> {
        self.node.clone()
    }

    /// Handle that stops the accept loop when notified.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Accept connections until a `shutdown` message arrives.
    ///
    /// Connections already being served finish on their own.
    pub async fn run(self) -> Result<()> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let node = self.node.clone();
                        let shutdown = self.shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve(stream, peer, node, shutdown).await {
                                debug!(%peer, error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                },
                _ = self.shutdown.notified() => {
                    info!(node = %self.node.me(), "shutting down");
                    return Ok(());
                }
            }
        }
    }
}

async fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    node: Arc<KvNode>,
    shutdown: Arc<Notify>,
) -> Result<()> {
    counter!("kv_connections_total").increment(1);
    stream.set_nodelay(true)?;
    let (read_half, mut writer) = stream.into_split();
    debug!(%peer, "connection accepted");

    let greeting = Message::response(Header::Connect, Status::ConnectSuccess, "", node.me().endpoint());
    write(&mut writer, &greeting).await?;

    let mut reader = FrameReader::new(read_half);
    loop {
        let frame = match reader.next_frame().await {
            Ok(Some(frame)) if frame.trim().is_empty() => continue,
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(StreamingError::Io(e)) => return Err(e.into()),
            Err(e) => return reject(&mut writer, peer, e).await,
        };
        let request = match decode(&frame) {
            Ok(request) => request,
            Err(e) => return reject(&mut writer, peer, e).await,
        };

        match dispatch(&node, request).await {
            Action::Reply(reply) => write(&mut writer, &reply).await?,
            Action::Close(reply) => {
                write(&mut writer, &reply).await?;
                break;
            }
            Action::Shutdown(reply) => {
                write(&mut writer, &reply).await?;
                shutdown.notify_one();
                break;
            }
        }
    }

    debug!(%peer, "connection closed");
    Ok(())
}

/// Answer an undecodable frame and drop the connection.
async fn reject(writer: &mut OwnedWriteHalf, peer: SocketAddr, e: StreamingError) -> Result<()> {
    warn!(%peer, error = %e, "closing connection on malformed frame");
    let reply = Message::response(Header::Disconnect, Status::Failed, "", e.to_string());
    write(writer, &reply).await
}

async fn write(writer: &mut OwnedWriteHalf, msg: &Message) -> Result<()> {
    writer.write_all(encode(msg).as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
