//! Bounded caches with pluggable eviction.
//!
//! Each policy keeps its value map and its eviction bookkeeping in one
//! struct and updates both in the same call, so a key is either fully
//! tracked or absent.
//!
//! - **FIFO**: evicts the earliest inserted key still present
//! - **LRU**: evicts the key whose last read or write is oldest
//! - **LFU**: evicts the key with the fewest recorded accesses
//!
//! Only inserting a key that is not yet cached can evict. A capacity of zero
//! disables caching.

pub mod fifo;
pub mod lfu;
pub mod lru;

pub use fifo::FifoCache;
pub use lfu::LfuCache;
pub use lru::LruCache;

use crate::error::StorageError;
use std::fmt;
use std::str::FromStr;

/// Eviction policy, chosen once per node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    #[default]
    Fifo,
    Lru,
    Lfu,
}

impl CacheStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStrategy::Fifo => "FIFO",
            CacheStrategy::Lru => "LRU",
            CacheStrategy::Lfu => "LFU",
        }
    }

    /// Build an empty cache of this policy.
    pub fn build(self, capacity: usize) -> Box<dyn Cache> {
        match self {
            CacheStrategy::Fifo => Box::new(FifoCache::new(capacity)),
            CacheStrategy::Lru => Box::new(LruCache::new(capacity)),
            CacheStrategy::Lfu => Box::new(LfuCache::new(capacity)),
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheStrategy {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIFO" => Ok(CacheStrategy::Fifo),
            "LRU" => Ok(CacheStrategy::Lru),
            "LFU" => Ok(CacheStrategy::Lfu),
            _ => Err(StorageError::UnknownStrategy(s.to_string())),
        }
    }
}

/// A bounded key/value cache.
pub trait Cache: Send {
    /// Value for `key`, recording the access.
    fn get(&mut self, key: &str) -> Option<String>;

    /// Value for `key` without touching eviction state.
    fn peek(&self, key: &str) -> Option<&str>;

    /// Insert or update. Returns the key evicted to make room, if any.
    fn insert(&mut self, key: String, value: String) -> Option<String>;

    fn remove(&mut self, key: &str) -> Option<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn clear(&mut self);

    fn strategy(&self) -> CacheStrategy;
}
