//! Tests for the hash ring implementation.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/lookup, remove
//! 2. **Multiple nodes**: Ownership, successors, replicas
//! 3. **Edge cases**: Wraparound, single node, degenerate replica sets
//! 4. **Text form**: Serialize/deserialize, malformed input
//! 5. **Properties**: Determinism and round trips over random rings

use corelib::node::{Node, NodeId};
use corelib::ring::{HashRing, RingBuilder};
use proptest::prelude::*;

fn node(id: u32, port: u16) -> Node {
    Node::new(NodeId(id), "127.0.0.1", port)
}

fn three_node_ring() -> HashRing {
    RingBuilder::new()
        .add_node(node(1, 5000))
        .add_node(node(2, 5001))
        .add_node(node(3, 5002))
        .build()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = HashRing::new();
    let probe = node(1, 5000);

    assert_eq!(ring.owner(b"key1"), None);
    assert_eq!(ring.successor(&probe), None);
    assert_eq!(ring.predecessor(&probe), None);
    assert_eq!(ring.replicas(b"key1"), None);
    assert!(!ring.can_serve(NodeId(1), b"key1"));
    assert!(!ring.contains(&probe));
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.serialize(), "");
}

#[test]
fn test_add_node_and_lookup() {
    let mut ring = HashRing::new();
    let n = node(1, 5000);

    assert!(ring.add_node(n.clone()).is_none());
    assert_eq!(ring.len(), 1);
    assert!(ring.contains(&n));

    assert_eq!(ring.owner(b"test-key"), Some(&n));
    assert_eq!(ring.node_by_id(NodeId(1)), Some(&n));
}

#[test]
fn test_remove_node() {
    let mut ring = HashRing::new();
    ring.add_node(node(1, 5000));
    ring.add_node(node(2, 5001));
    assert_eq!(ring.len(), 2);

    assert!(ring.remove_node(&node(1, 5000)), "Should successfully remove node");
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.owner(b"some-key"), Some(&node(2, 5001)));
    assert!(ring.node_by_id(NodeId(1)).is_none());

    assert!(!ring.remove_node(&node(9, 5999)), "Should return false for non-existent node");
}

#[test]
fn test_add_remove_add() {
    let mut ring = HashRing::new();
    ring.add_node(node(1, 5000));
    assert!(ring.remove_node(&node(1, 5000)));
    assert!(ring.is_empty());

    ring.add_node(node(1, 5000));
    assert_eq!(ring.len(), 1);
    assert!(ring.owner(b"key").is_some());
}

#[test]
fn test_idempotent_add() {
    let mut ring = HashRing::new();
    ring.add_node(node(1, 5000));

    // Same endpoint lands on the same token and replaces the descriptor.
    let previous = ring.add_node(node(4, 5000));
    assert_eq!(previous.map(|n| n.id), Some(NodeId(1)));
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.owner(b"k").map(|n| n.id), Some(NodeId(4)));
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_every_key_has_a_member_owner() {
    let ring = three_node_ring();
    let members = ring.nodes();

    for i in 0..200 {
        let key = format!("key{i}");
        let owner = ring.owner(key.as_bytes()).expect("non-empty ring always has an owner");
        assert!(members.contains(&owner));
    }
}

#[test]
fn test_successor_walk_visits_every_node() {
    let ring = three_node_ring();
    let start = ring.nodes()[0].clone();

    let mut current = start.clone();
    let mut seen = Vec::new();
    for _ in 0..3 {
        current = ring.successor(&current).unwrap().clone();
        seen.push(current.id);
    }
    assert_eq!(current, start, "three hops around a three node ring come back");
    seen.sort();
    assert_eq!(seen, vec![NodeId(1), NodeId(2), NodeId(3)]);
}

#[test]
fn test_replicas_are_the_owners_successors() {
    let ring = three_node_ring();

    for i in 0..50 {
        let key = format!("k{i}");
        let owner = ring.owner(key.as_bytes()).unwrap();
        let (first, second) = ring.replicas(key.as_bytes()).unwrap();

        assert_eq!(first, ring.successor(owner).unwrap());
        assert_eq!(second, ring.successor(first).unwrap());
        assert_ne!(first, owner);
        assert_ne!(second, owner);
        assert_ne!(first, second);
    }
}

#[test]
fn test_can_serve_matches_owner_and_replicas() {
    let mut ring = three_node_ring();
    ring.add_node(node(4, 5003));

    for i in 0..50 {
        let key = format!("key-{i}");
        let owner = ring.owner(key.as_bytes()).unwrap().id;
        let (r1, r2) = ring.replicas(key.as_bytes()).unwrap();
        let (r1, r2) = (r1.id, r2.id);

        for id in 1..=4 {
            let expected = [owner, r1, r2].contains(&NodeId(id));
            assert_eq!(ring.can_serve(NodeId(id), key.as_bytes()), expected);
        }
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_single_node() {
    let mut ring = HashRing::new();
    let only = node(1, 5000);
    ring.add_node(only.clone());

    for key in ["key1", "key2", "key3", "very-long-key-name"] {
        let key = key.as_bytes();
        assert_eq!(ring.owner(key), Some(&only));
        assert_eq!(ring.replicas(key), Some((&only, &only)));
        assert!(ring.can_serve(NodeId(1), key));
    }
    assert_eq!(ring.successor(&only), Some(&only));
    assert_eq!(ring.predecessor(&only), Some(&only));
}

#[test]
fn test_two_node_replicas_repeat() {
    let ring = RingBuilder::new()
        .add_node(node(1, 5000))
        .add_node(node(2, 5001))
        .build();

    let owner = ring.owner(b"abc").unwrap();
    let (first, second) = ring.replicas(b"abc").unwrap();
    assert_ne!(first, owner);
    assert_eq!(second, owner, "second replica wraps back to the owner");
}

#[test]
fn test_wraparound_to_first_node() {
    let ring = three_node_ring();
    let tokens = ring.tokens();
    let last = ring.node_by_id(tokens[tokens.len() - 1].1).unwrap();
    let first = ring.node_by_id(tokens[0].1).unwrap();

    assert_eq!(ring.successor(last), Some(first));
    assert_eq!(ring.predecessor(first), Some(last));
}

// ============================================================================
// Text Form Tests
// ============================================================================

#[test]
fn test_serialize_format() {
    let mut ring = HashRing::new();
    let n = node(7, 5000);
    ring.add_node(n.clone());

    let expected = format!("{} 127.0.0.1 5000 7", ring.node_token(&n));
    assert_eq!(ring.serialize(), expected);
}

#[test]
fn test_deserialize_skips_malformed_entries() {
    let ring = three_node_ring();
    let text = format!("{},garbage,1 2,notanumber host 1 1", ring.serialize());

    let parsed = HashRing::deserialize(&text);
    assert_eq!(parsed, ring);
    assert_eq!(HashRing::deserialize("").len(), 0);
}

// ============================================================================
// Properties
// ============================================================================

fn ring_from_ports(ports: &[u16], removed: &[u16]) -> HashRing {
    let mut ring = HashRing::new();
    for (i, port) in ports.iter().enumerate() {
        ring.add_node(node(i as u32, *port));
    }
    for port in removed {
        ring.remove_node(&node(0, *port));
    }
    ring
}

proptest! {
    #[test]
    fn prop_round_trip_preserves_ownership(
        ports in proptest::collection::vec(1024u16..65535, 0..12),
        removed in proptest::collection::vec(1024u16..65535, 0..4),
        keys in proptest::collection::vec("[a-z0-9]{1,20}", 1..30),
    ) {
        let ring = ring_from_ports(&ports, &removed);
        let parsed = HashRing::deserialize(&ring.serialize());

        for key in &keys {
            prop_assert_eq!(ring.owner(key.as_bytes()), parsed.owner(key.as_bytes()));
            prop_assert_eq!(ring.replicas(key.as_bytes()), parsed.replicas(key.as_bytes()));
        }
    }

    #[test]
    fn prop_owner_is_stable(
        ports in proptest::collection::vec(1024u16..65535, 1..12),
        key in "[a-z0-9]{1,20}",
    ) {
        let ring = ring_from_ports(&ports, &[]);
        let first = ring.owner(key.as_bytes()).cloned();
        prop_assert!(first.is_some());
        prop_assert_eq!(first.as_ref(), ring.owner(key.as_bytes()));
    }

    #[test]
    fn prop_replicas_differ_from_owner_with_three_or_more(
        ports in proptest::collection::hash_set(1024u16..65535, 3..12),
        key in "[a-z0-9]{1,20}",
    ) {
        let ports: Vec<u16> = ports.into_iter().collect();
        let ring = ring_from_ports(&ports, &[]);
        prop_assume!(ring.len() >= 3);

        let owner = ring.owner(key.as_bytes()).unwrap();
        let (first, second) = ring.replicas(key.as_bytes()).unwrap();
        prop_assert_ne!(first, owner);
        prop_assert_ne!(second, owner);
    }
}
