//! Replication and migration against in-process fake peers.

use corelib::node::{Node, NodeId};
use corelib::ring::RingBuilder;
use parking_lot::Mutex;
use replication::health::probe;
use replication::migration::plan;
use replication::{Migrator, ProbePolicy, ReplicationError, Replicator};
use std::sync::Arc;
use std::time::Duration;
use storage::{CacheStrategy, StorageEngine};
use streaming::codec::{decode, encode};
use streaming::{FrameReader, Header, Message, Status};
use tempfile::tempdir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_millis(500);

fn fast_probe() -> ProbePolicy {
    ProbePolicy {
        attempts: 2,
        backoff: Duration::from_millis(10),
        timeout: TIMEOUT,
    }
}

/// A peer that greets every connection and acknowledges every `admin_put`,
/// recording what it received.
async fn recording_peer(id: u32) -> (Node, Arc<Mutex<Vec<Message>>>) {
    scripted_peer(id, usize::MAX).await
}

/// Like [`recording_peer`], but answers `PUT_ERROR` once `accept` writes have
/// been acknowledged. Refused writes are not recorded.
async fn scripted_peer(id: u32, accept: usize) -> (Node, Arc<Mutex<Vec<Message>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let log = log.clone();
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let greeting = Message::response(Header::Connect, Status::ConnectSuccess, "", "");
                write_half.write_all(encode(&greeting).as_bytes()).await.unwrap();

                let mut reader = FrameReader::new(read_half);
                while let Ok(Some(frame)) = reader.next_frame().await {
                    let request = decode(&frame).unwrap();
                    if request.header == Header::Disconnect {
                        break;
                    }
                    let reply = {
                        let mut log = log.lock();
                        if log.len() < accept {
                            let reply = request.reply(Status::PutSuccess, request.value.clone());
                            log.push(request);
                            reply
                        } else {
                            request.reply(Status::PutError, "")
                        }
                    };
                    if write_half.write_all(encode(&reply).as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (Node::new(NodeId(id), "127.0.0.1", port), seen)
}

/// A descriptor for a port nobody listens on.
async fn dead_node(id: u32) -> Node {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Node::new(NodeId(id), "127.0.0.1", port)
}

#[tokio::test]
async fn test_partial_replication_is_reported_per_replica() {
    let (live, seen) = recording_peer(2).await;
    let dead = dead_node(3).await;

    let replicator = Replicator::new(TIMEOUT);
    let outcomes = replicator
        .replicate(&[live.clone(), dead.clone()], "color", "blue")
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_ok());
    assert_eq!(outcomes[0].replica, live);
    assert!(!outcomes[1].is_ok());
    assert_eq!(outcomes[1].replica, dead);

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], Message::admin_put("color", "blue"));
}

#[tokio::test]
async fn test_replication_targets_skip_owner() {
    let nodes: Vec<Node> = (1..=4)
        .map(|i| Node::new(NodeId(i), "10.0.0.1", 7000 + i as u16))
        .collect();
    let ring = nodes
        .iter()
        .cloned()
        .fold(RingBuilder::new(), RingBuilder::add_node)
        .build();

    let replicator = Replicator::new(TIMEOUT);
    let targets = replicator.targets(&ring, "some-key");
    let (first, second) = ring.replicas(b"some-key").unwrap();

    assert_eq!(targets, vec![first.clone(), second.clone()]);
    assert!(!targets.contains(ring.owner(b"some-key").unwrap()));
}

#[tokio::test]
async fn test_probe_gives_up_after_bounded_attempts() {
    let dead = dead_node(9).await;
    let err = probe(&dead.endpoint(), &fast_probe()).await.unwrap_err();
    assert!(matches!(err, ReplicationError::Unreachable { attempts: 2, .. }));

    let (live, _) = recording_peer(1).await;
    probe(&live.endpoint(), &fast_probe()).await.unwrap();
}

#[tokio::test]
async fn test_migration_moves_keys_to_new_owner() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(StorageEngine::new(dir.path().join("self.db"), CacheStrategy::Lru, 8));
    for i in 0..40 {
        engine.put(&format!("key{i}"), &format!("value{i}")).unwrap();
    }

    let me = Node::new(NodeId(1), "127.0.0.1", 1);
    let (target, seen) = recording_peer(2).await;
    let ring = RingBuilder::new()
        .add_node(me)
        .add_node(target.clone())
        .build();
    let expected = plan(&ring, &engine.entries().unwrap(), &target);

    let migrator = Migrator::new(TIMEOUT, fast_probe());
    let report = migrator.transfer(&engine, &ring, &target).await.unwrap();

    assert_eq!(report.target, target);
    assert_eq!(report.moved, expected.len());
    assert_eq!(engine.entries().unwrap().len(), 40 - expected.len());
    for (key, _) in &expected {
        assert!(!engine.in_storage(key).unwrap());
    }
    let received: Vec<(String, String)> = seen
        .lock()
        .iter()
        .map(|m| (m.key.clone(), m.value.clone()))
        .collect();
    assert_eq!(received, expected);
}

#[tokio::test]
async fn test_migration_to_unreachable_target_moves_nothing() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(StorageEngine::new(dir.path().join("self.db"), CacheStrategy::Fifo, 8));
    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();

    // Sole member, so it owns every key.
    let target = dead_node(2).await;
    let ring = RingBuilder::new().add_node(target.clone()).build();

    let migrator = Migrator::new(TIMEOUT, fast_probe());
    let err = migrator.transfer(&engine, &ring, &target).await.unwrap_err();

    assert!(matches!(err, ReplicationError::Unreachable { .. }));
    assert_eq!(engine.entries().unwrap().len(), 2);
}

#[tokio::test]
async fn test_migration_with_nothing_to_move_skips_the_network() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(StorageEngine::new(dir.path().join("self.db"), CacheStrategy::Fifo, 8));
    let target = dead_node(2).await;
    let ring = RingBuilder::new().add_node(target.clone()).build();

    let report = Migrator::new(TIMEOUT, fast_probe())
        .transfer(&engine, &ring, &target)
        .await
        .unwrap();
    assert_eq!(report.moved, 0);
}

#[tokio::test]
async fn test_refused_transfer_keeps_earlier_keys_moved() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(StorageEngine::new(dir.path().join("self.db"), CacheStrategy::Fifo, 8));
    for key in ["a", "b", "c"] {
        engine.put(key, "v").unwrap();
    }

    let (target, seen) = scripted_peer(2, 1).await;
    let ring = RingBuilder::new().add_node(target.clone()).build();

    let err = Migrator::new(TIMEOUT, fast_probe())
        .transfer(&engine, &ring, &target)
        .await
        .unwrap_err();

    assert!(matches!(err, ReplicationError::Refused { ref key, .. } if key == "b"));
    // "a" went first and was acknowledged, so it stays moved.
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(seen.lock()[0].key, "a");
    assert!(!engine.in_storage("a").unwrap());
    assert!(engine.in_storage("b").unwrap());
    assert!(engine.in_storage("c").unwrap());
}
