//! Node abstractions for the consistent hash ring.
//!
//! A node is a storage server reachable at `address:port`. Its ring position
//! is derived from that endpoint, so two descriptors naming the same endpoint
//! are the same node no matter which `NodeId` they carry.

use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Compact identifier for a node in the cluster.
///
/// A small integer assigned by whoever builds the ring. It is used where a
/// node has to recognise itself among ring members (read fan-out, migration
/// short-circuits), not for equality.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage node participating in the ring.
///
/// Keep this struct small and cheap to clone; connections and storage live
/// elsewhere.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    /// Host name or IP address the node listens on.
    pub address: String,
    pub port: u16,
}

impl Node {
    /// Construct a new node descriptor.
    pub fn new(id: NodeId, address: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            address: address.into(),
            port,
        }
    }

    /// Parse a descriptor from `"<address> <port>"`.
    pub fn from_endpoint(id: NodeId, endpoint: &str) -> Result<Self> {
        let mut parts = endpoint.split_whitespace();
        let (Some(address), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidNode(format!(
                "expected \"<address> <port>\", got {endpoint:?}"
            )));
        };
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::InvalidNode(format!("bad port {port:?}: {e}")))?;
        Ok(Self::new(id, address, port))
    }

    /// `address:port`, suitable for `TcpStream::connect`.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.port == other.port
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.port.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (id {})", self.address, self.port, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_id() {
        let a = Node::new(NodeId(1), "127.0.0.1", 5000);
        let b = Node::new(NodeId(9), "127.0.0.1", 5000);
        let c = Node::new(NodeId(1), "127.0.0.1", 5001);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_endpoint() {
        let node = Node::from_endpoint(NodeId(3), "10.0.0.7 50000").unwrap();
        assert_eq!(node.address, "10.0.0.7");
        assert_eq!(node.port, 50000);
        assert_eq!(node.id, NodeId(3));
        assert_eq!(node.endpoint(), "10.0.0.7:50000");
    }

    #[test]
    fn test_from_endpoint_rejects_garbage() {
        assert!(Node::from_endpoint(NodeId(1), "").is_err());
        assert!(Node::from_endpoint(NodeId(1), "host").is_err());
        assert!(Node::from_endpoint(NodeId(1), "host notaport").is_err());
        assert!(Node::from_endpoint(NodeId(1), "host 1 2").is_err());
    }
}
