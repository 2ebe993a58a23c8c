//! Least-recently-used eviction.
//!
//! Every read and every write stamps the key with a fresh tick; the smallest
//! tick is the eviction victim.

use super::{Cache, CacheStrategy};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug)]
pub struct LruCache {
    capacity: usize,
    /// key -> (value, last access tick)
    values: HashMap<String, (String, u64)>,
    /// last access tick -> key, oldest first
    recency: BTreeMap<u64, String>,
    tick: u64,
}

impl LruCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: HashMap::with_capacity(capacity),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &str) {
        let tick = self.next_tick();
        if let Some((_, last)) = self.values.get_mut(key) {
            if let Some(k) = self.recency.remove(last) {
                self.recency.insert(tick, k);
            }
            *last = tick;
        }
    }
}

impl Cache for LruCache {
    fn get(&mut self, key: &str) -> Option<String> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.touch(key);
        self.values.get(key).map(|(value, _)| value.clone())
    }

    fn peek(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|(value, _)| value.as_str())
    }

    fn insert(&mut self, key: String, value: String) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        if let Some((existing, _)) = self.values.get_mut(&key) {
            *existing = value;
            self.touch(&key);
            return None;
        }

        let evicted = if self.values.len() >= self.capacity {
            let oldest = self.recency.pop_first().map(|(_, k)| k);
            if let Some(oldest) = &oldest {
                self.values.remove(oldest);
            }
            oldest
        } else {
            None
        };
        let tick = self.next_tick();
        self.recency.insert(tick, key.clone());
        self.values.insert(key, (value, tick));
        evicted
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let (value, tick) = self.values.remove(key)?;
        self.recency.remove(&tick);
        Some(value)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.values.clear();
        self.recency.clear();
    }

    fn strategy(&self) -> CacheStrategy {
        CacheStrategy::Lru
    }
}
