//! Least-frequently-used eviction.
//!
//! Each key carries an access counter (an insert counts as the first access,
//! reads and updates add one). On overflow a full scan picks the lowest
//! counter; among equal counters the earliest inserted key loses.

use super::{Cache, CacheStrategy};
use std::collections::HashMap;

#[derive(Debug)]
struct Entry {
    value: String,
    hits: u64,
    /// Insertion sequence number, breaks ties between equal counters.
    seq: u64,
}

#[derive(Debug)]
pub struct LfuCache {
    capacity: usize,
    values: HashMap<String, Entry>,
    seq: u64,
}

impl LfuCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: HashMap::with_capacity(capacity),
            seq: 0,
        }
    }

    /// Recorded access count for `key`.
    pub fn hits(&self, key: &str) -> Option<u64> {
        self.values.get(key).map(|e| e.hits)
    }

    fn victim(&self) -> Option<String> {
        self.values
            .iter()
            .min_by_key(|(_, e)| (e.hits, e.seq))
            .map(|(k, _)| k.clone())
    }
}

impl Cache for LfuCache {
    fn get(&mut self, key: &str) -> Option<String> {
        let entry = self.values.get_mut(key)?;
        entry.hits += 1;
        Some(entry.value.clone())
    }

    fn peek(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|e| e.value.as_str())
    }

    fn insert(&mut self, key: String, value: String) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(entry) = self.values.get_mut(&key) {
            entry.value = value;
            entry.hits += 1;
            return None;
        }

        let evicted = if self.values.len() >= self.capacity {
            let victim = self.victim();
            if let Some(victim) = &victim {
                self.values.remove(victim);
            }
            victim
        } else {
            None
        };
        self.seq += 1;
        self.values.insert(
            key,
            Entry {
                value,
                hits: 1,
                seq: self.seq,
            },
        );
        evicted
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key).map(|e| e.value)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn strategy(&self) -> CacheStrategy {
        CacheStrategy::Lfu
    }
}
