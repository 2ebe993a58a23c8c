//! Hash ring data structure.
//!
//! Holds a `BTreeMap<Md5Token, Node>` with one position per node. The map is
//! read circularly: a lookup that runs past the largest token wraps to the
//! smallest one.
//!
//! # Ownership
//!
//! A key is owned by the first node whose token is `>=` the key's token
//! (ceiling lookup), wrapping to the first node on a miss. The two replicas of
//! a key are the next two positions clockwise from the owner. Rings with fewer
//! than three members hand out repeated nodes instead of failing.
//!
//! # Text form
//!
//! `serialize` produces comma-separated `"<token> <address> <port> <id>"`
//! tuples; `deserialize` rebuilds the map keyed by the stated token and skips
//! any tuple it cannot read.

use crate::node::{Node, NodeId};
use crate::partitioner::{Md5Partitioner, Partitioner};
use crate::token::Md5Token;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// Consistent hash ring of storage nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashRing {
    positions: BTreeMap<Md5Token, Node>,
    partitioner: Md5Partitioner,
}

impl HashRing {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token a node occupies on the ring.
    pub fn node_token(&self, node: &Node) -> Md5Token {
        self.partitioner.node_token(&node.address, node.port)
    }

    /// Token a key hashes to.
    pub fn key_token(&self, key: &[u8]) -> Md5Token {
        self.partitioner.partition(key)
    }

    /// Place a node on the ring.
    ///
    /// Returns the descriptor previously stored at the same token, if any.
    /// Colliding tokens overwrite.
    pub fn add_node(&mut self, node: Node) -> Option<Node> {
        let token = self.node_token(&node);
        self.positions.insert(token, node)
    }

    /// Remove a node from the ring. Returns `false` if it was not a member.
    pub fn remove_node(&mut self, node: &Node) -> bool {
        let token = self.node_token(node);
        match self.positions.get(&token) {
            Some(existing) if existing == node => {
                self.positions.remove(&token);
                true
            }
            _ => false,
        }
    }

    /// True if `node` holds a position on the ring.
    pub fn contains(&self, node: &Node) -> bool {
        self.positions
            .get(&self.node_token(node))
            .is_some_and(|existing| existing == node)
    }

    /// Node responsible for `key`.
    pub fn owner(&self, key: &[u8]) -> Option<&Node> {
        self.ceiling(self.key_token(key)).map(|(_, node)| node)
    }

    /// Next node clockwise from `node`'s position.
    pub fn successor(&self, node: &Node) -> Option<&Node> {
        self.higher(self.node_token(node)).map(|(_, node)| node)
    }

    /// Previous node counter-clockwise from `node`'s position.
    pub fn predecessor(&self, node: &Node) -> Option<&Node> {
        self.lower(self.node_token(node)).map(|(_, node)| node)
    }

    /// The two replica holders for `key`: the two positions after the owner.
    ///
    /// With fewer than three members the answer revisits nodes (possibly the
    /// owner itself).
    pub fn replicas(&self, key: &[u8]) -> Option<(&Node, &Node)> {
        let (owner_token, _) = self.ceiling(self.key_token(key))?;
        let (first_token, first) = self.higher(*owner_token)?;
        let (_, second) = self.higher(*first_token)?;
        Some((first, second))
    }

    /// True if the node with `id` is the owner or one of the two replicas of
    /// `key`, i.e. it may answer reads for it.
    pub fn can_serve(&self, id: NodeId, key: &[u8]) -> bool {
        let Some((mut token, mut node)) = self.ceiling(self.key_token(key)) else {
            return false;
        };
        for _ in 0..3 {
            if node.id == id {
                return true;
            }
            match self.higher(*token) {
                Some((next_token, next)) => {
                    token = next_token;
                    node = next;
                }
                None => break,
            }
        }
        false
    }

    /// Look up a member by its id.
    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.positions.values().find(|node| node.id == id)
    }

    /// All members in token order.
    pub fn nodes(&self) -> Vec<&Node> {
        self.positions.values().collect()
    }

    /// All (token, node id) pairs in token order.
    pub fn tokens(&self) -> Vec<(Md5Token, NodeId)> {
        self.positions
            .iter()
            .map(|(token, node)| (*token, node.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat text form distributed to nodes and clients.
    pub fn serialize(&self) -> String {
        self.positions
            .iter()
            .map(|(token, node)| format!("{} {} {} {}", token, node.address, node.port, node.id))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Rebuild a ring from its text form. Entries with too few fields or
    /// unparseable numbers are skipped.
    pub fn deserialize(text: &str) -> Self {
        let mut ring = Self::new();
        for entry in text.split(',') {
            let fields: Vec<&str> = entry.split_whitespace().collect();
            if fields.len() < 4 {
                continue;
            }
            let (Ok(token), Ok(port), Ok(id)) = (
                fields[0].parse::<Md5Token>(),
                fields[2].parse::<u16>(),
                fields[3].parse::<u32>(),
            ) else {
                continue;
            };
            ring.positions
                .insert(token, Node::new(NodeId(id), fields[1], port));
        }
        ring
    }

    fn ceiling(&self, token: Md5Token) -> Option<(&Md5Token, &Node)> {
        self.positions
            .range(token..)
            .next()
            .or_else(|| self.positions.iter().next())
    }

    fn higher(&self, token: Md5Token) -> Option<(&Md5Token, &Node)> {
        self.positions
            .range((Excluded(token), Unbounded))
            .next()
            .or_else(|| self.positions.iter().next())
    }

    fn lower(&self, token: Md5Token) -> Option<(&Md5Token, &Node)> {
        self.positions
            .range(..token)
            .next_back()
            .or_else(|| self.positions.iter().next_back())
    }
}

/// Builder for a ring with a known initial membership.
#[derive(Debug, Default)]
pub struct RingBuilder {
    nodes: Vec<Node>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> HashRing {
        let mut ring = HashRing::new();
        for node in self.nodes {
            ring.add_node(node);
        }
        ring
    }
}
