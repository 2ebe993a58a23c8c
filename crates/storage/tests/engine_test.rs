//! Storage engine behaviour across eviction policies.

use proptest::prelude::*;
use storage::{CacheStrategy, PutOutcome, StorageEngine, TOMBSTONE};
use tempfile::{tempdir, TempDir};

fn open(strategy: CacheStrategy, capacity: usize) -> (TempDir, StorageEngine) {
    let dir = tempdir().unwrap();
    let engine = StorageEngine::new(dir.path().join("node.db"), strategy, capacity);
    (dir, engine)
}

#[test]
fn test_fifo_evicts_first_inserted() {
    let n = 3;
    let (_dir, engine) = open(CacheStrategy::Fifo, n);
    for i in 0..=n {
        engine.put(&format!("k{i}"), "v").unwrap();
    }

    assert!(!engine.in_cache("k0"));
    for i in 1..=n {
        assert!(engine.in_cache(&format!("k{i}")));
    }
    // Evicted from the cache, not from the log.
    assert!(engine.in_storage("k0").unwrap());
}

#[test]
fn test_lru_reaccess_saves_oldest() {
    let n = 3;
    let (_dir, engine) = open(CacheStrategy::Lru, n);
    for i in 0..n {
        engine.put(&format!("k{i}"), "v").unwrap();
    }
    engine.get("k0").unwrap();
    engine.put("new", "v").unwrap();

    assert!(engine.in_cache("k0"));
    assert!(!engine.in_cache("k1"));
}

#[test]
fn test_lfu_evicts_fewest_accesses() {
    let (_dir, engine) = open(CacheStrategy::Lfu, 3);
    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();
    engine.put("c", "3").unwrap();
    for _ in 0..3 {
        engine.get("a").unwrap();
        engine.get("b").unwrap();
    }
    engine.get("c").unwrap();

    engine.put("d", "4").unwrap();
    assert!(!engine.in_cache("c"));
    assert!(engine.in_cache("a") && engine.in_cache("b") && engine.in_cache("d"));
}

#[test]
fn test_log_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("node.db");
    {
        let engine = StorageEngine::new(&path, CacheStrategy::Fifo, 2);
        engine.put("a", "1").unwrap();
        engine.put("b", "2").unwrap();
        engine.put("a", TOMBSTONE).unwrap();
    }

    let engine = StorageEngine::new(&path, CacheStrategy::Lru, 2);
    assert_eq!(engine.get("a").unwrap(), None);
    assert_eq!(engine.get("b").unwrap().as_deref(), Some("2"));
    assert_eq!(engine.put("b", "3").unwrap(), PutOutcome::Updated);
}

#[derive(Debug, Clone)]
enum Op {
    Get(u8),
    Put(u8, u8),
    Delete(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8).prop_map(Op::Get),
        (0u8..8, 0u8..4).prop_map(|(k, v)| Op::Put(k, v)),
        (0u8..8).prop_map(Op::Delete),
    ]
}

fn strategy() -> impl Strategy<Value = CacheStrategy> {
    prop_oneof![
        Just(CacheStrategy::Fifo),
        Just(CacheStrategy::Lru),
        Just(CacheStrategy::Lfu),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cache_agrees_with_log(
        strategy in strategy(),
        capacity in 0usize..5,
        ops in proptest::collection::vec(op(), 1..40),
    ) {
        let (_dir, engine) = open(strategy, capacity);

        for op in ops {
            match op {
                Op::Get(k) => { engine.get(&format!("k{k}")).unwrap(); }
                Op::Put(k, v) => { engine.put(&format!("k{k}"), &format!("v{v}")).unwrap(); }
                Op::Delete(k) => { engine.put(&format!("k{k}"), TOMBSTONE).unwrap(); }
            }
            prop_assert!(engine.cached_len() <= capacity);
        }

        let log = engine.entries().unwrap();
        for k in 0u8..8 {
            let key = format!("k{k}");
            if engine.in_cache(&key) {
                // A cached read must return exactly what the log holds.
                prop_assert_eq!(engine.get(&key).unwrap(), log.get(&key).cloned());
            }
        }
    }
}
