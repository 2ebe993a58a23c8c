//! Storage engine: cache + durable log under a single lock.

use crate::cache::{Cache, CacheStrategy};
use crate::error::{Result, StorageError};
use crate::log::DurableLog;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// Value that turns a put into a delete. Never stored.
pub const TOMBSTONE: &str = "null";

/// What a successful `put` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Updated,
    /// Also returned when the key was not stored to begin with.
    Deleted,
}

struct Inner {
    cache: Box<dyn Cache>,
    log: DurableLog,
}

/// One node's key/value store.
///
/// Every operation re-reads the durable log before deciding anything, except
/// a `get` that hits the cache. Calls block on file I/O while holding the
/// lock; async callers should run them on the blocking pool
/// (`tokio::task::spawn_blocking`).
pub struct StorageEngine {
    inner: Mutex<Inner>,
}

impl StorageEngine {
    pub fn new(path: impl Into<PathBuf>, strategy: CacheStrategy, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cache: strategy.build(capacity),
                log: DurableLog::new(path),
            }),
        }
    }

    /// Run `f` against the engine on tokio's blocking pool.
    pub async fn blocking<T, F>(self: &Arc<Self>, f: F) -> Result<T>
    where
        F: FnOnce(&StorageEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| StorageError::Io(io::Error::new(io::ErrorKind::Other, e)))?
    }

    /// Look up `key`, falling back to the durable log on a cache miss.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.lock();
        if let Some(value) = inner.cache.get(key) {
            trace!(key, "cache hit");
            return Ok(Some(value));
        }

        let entries = inner.log.load()?;
        let Some(value) = entries.get(key).cloned() else {
            debug!(key, "not found");
            return Ok(None);
        };
        if let Some(evicted) = inner.cache.insert(key.to_string(), value.clone()) {
            trace!(key = %evicted, "evicted");
        }
        Ok(Some(value))
    }

    /// Insert, update or (with [`TOMBSTONE`]) delete `key`.
    ///
    /// The cache is only touched after the log rewrite succeeded, so a failed
    /// write leaves both tiers as they were.
    pub fn put(&self, key: &str, value: &str) -> Result<PutOutcome> {
        for field in [key, value] {
            if field.contains(&['\n', '\r'][..]) {
                return Err(StorageError::InvalidEntry(field.to_string()));
            }
        }

        let mut inner = self.inner.lock();
        let mut entries = inner.log.load()?;

        if value == TOMBSTONE {
            if entries.remove(key).is_some() {
                inner.log.rewrite(&entries)?;
            }
            inner.cache.remove(key);
            debug!(key, "deleted");
            return Ok(PutOutcome::Deleted);
        }

        let outcome = match entries.insert(key.to_string(), value.to_string()) {
            Some(_) => PutOutcome::Updated,
            None => PutOutcome::Inserted,
        };
        inner.log.rewrite(&entries)?;
        if let Some(evicted) = inner.cache.insert(key.to_string(), value.to_string()) {
            trace!(key = %evicted, "evicted");
        }
        debug!(key, ?outcome, "stored");
        Ok(outcome)
    }

    /// Snapshot of the durable log.
    pub fn entries(&self) -> Result<BTreeMap<String, String>> {
        self.inner.lock().log.load()
    }

    pub fn in_cache(&self, key: &str) -> bool {
        self.inner.lock().cache.peek(key).is_some()
    }

    pub fn in_storage(&self, key: &str) -> Result<bool> {
        Ok(self.inner.lock().log.load()?.contains_key(key))
    }

    /// Number of entries currently cached.
    pub fn cached_len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// Drop the cache and re-read the log. Returns the number of entries on
    /// disk.
    pub fn reload(&self) -> Result<usize> {
        let mut inner = self.inner.lock();
        let entries = inner.log.load()?;
        inner.cache.clear();
        Ok(entries.len())
    }
}
