//! Peer health probes.
//!
//! A probe succeeds when the peer accepts a connection and greets it with
//! `CONNECT_SUCCESS`. Failed attempts are retried with doubling backoff.

use crate::error::{ReplicationError, Result};
use std::time::Duration;
use streaming::{Connection, Header, Message};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct ProbePolicy {
    pub attempts: usize,
    /// Pause before the second attempt, doubled after each failure.
    pub backoff: Duration,
    /// Per-attempt connect + greeting timeout.
    pub timeout: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(100),
            timeout: Duration::from_secs(1),
        }
    }
}

/// Check that the node at `endpoint` is up.
pub async fn probe(endpoint: &str, policy: &ProbePolicy) -> Result<()> {
    let mut delay = policy.backoff;
    for attempt in 1..=policy.attempts {
        match Connection::open(endpoint, policy.timeout).await {
            Ok(mut conn) => {
                // Best effort goodbye; the probe already succeeded.
                let _ = conn.send(&Message::command(Header::Disconnect)).await;
                debug!(peer = endpoint, attempt, "probe ok");
                return Ok(());
            }
            Err(e) => {
                warn!(peer = endpoint, attempt, error = %e, "probe failed");
                if attempt < policy.attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
    Err(ReplicationError::Unreachable {
        peer: endpoint.to_string(),
        attempts: policy.attempts,
    })
}
