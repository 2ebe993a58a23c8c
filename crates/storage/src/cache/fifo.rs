//! First-in, first-out eviction.

use super::{Cache, CacheStrategy};
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct FifoCache {
    capacity: usize,
    values: HashMap<String, String>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

impl FifoCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }
}

impl Cache for FifoCache {
    fn get(&mut self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn peek(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: String, value: String) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(existing) = self.values.get_mut(&key) {
            *existing = value;
            return None;
        }

        let evicted = if self.values.len() >= self.capacity {
            let oldest = self.order.pop_front();
            if let Some(oldest) = &oldest {
                self.values.remove(oldest);
            }
            oldest
        } else {
            None
        };
        self.order.push_back(key.clone());
        self.values.insert(key, value);
        evicted
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let value = self.values.remove(key)?;
        self.order.retain(|k| k != key);
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
        self.order.clear();
    }

    fn strategy(&self) -> CacheStrategy {
        CacheStrategy::Fifo
    }
}
