//! Outbound connection to a node.
//!
//! Used for node-to-node traffic (replication pushes, migration transfers,
//! health probes) and by tests acting as a client. Every network step runs
//! under the connection's timeout.

use crate::codec::{decode, encode};
use crate::error::{Result, StreamingError};
use crate::protocol::{Message, Status};
use crate::receiver::FrameReader;
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

pub struct Connection {
    reader: FrameReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: String,
    timeout: Duration,
}

impl Connection {
    /// Connect to `endpoint` (`host:port`) and wait for the node's
    /// `CONNECT_SUCCESS` greeting.
    pub async fn open(endpoint: &str, timeout: Duration) -> Result<Self> {
        let stream = within(timeout, endpoint, TcpStream::connect(endpoint)).await??;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();

        let mut conn = Self {
            reader: FrameReader::new(read_half),
            writer: write_half,
            peer: endpoint.to_string(),
            timeout,
        };

        let greeting = conn.receive().await?;
        if greeting.status != Some(Status::ConnectSuccess) {
            return Err(StreamingError::Rejected {
                peer: conn.peer,
                reason: format!("unexpected greeting {greeting:?}"),
            });
        }
        debug!(peer = %conn.peer, "connected");
        Ok(conn)
    }

    pub async fn send(&mut self, msg: &Message) -> Result<()> {
        let wire = encode(msg);
        let writer = &mut self.writer;
        within(self.timeout, &self.peer, async move {
            writer.write_all(wire.as_bytes()).await?;
            writer.flush().await
        })
        .await??;
        Ok(())
    }

    pub async fn receive(&mut self) -> Result<Message> {
        let frame = within(self.timeout, &self.peer, self.reader.next_frame()).await??;
        match frame {
            Some(frame) => decode(&frame),
            None => Err(StreamingError::Closed(self.peer.clone())),
        }
    }

    /// Send `msg` and wait for the matching response.
    pub async fn request(&mut self, msg: &Message) -> Result<Message> {
        self.send(msg).await?;
        self.receive().await
    }
}

async fn within<F: Future>(timeout: Duration, peer: &str, fut: F) -> Result<F::Output> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| StreamingError::Timeout(peer.to_string()))
}
