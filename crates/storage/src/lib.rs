//! Per-node storage engine.
//!
//! A bounded in-memory cache sits in front of a durable key/value log that
//! holds every live entry. Both tiers share one lock so a reader never sees
//! them disagree.
//!
//! - [`cache`]: FIFO, LRU and LFU eviction behind the [`Cache`] trait
//! - [`log`]: the on-disk log, rewritten in full on every mutation
//! - [`engine`]: `get`/`put` tying the two together

pub mod cache;
pub mod engine;
pub mod error;
pub mod log;

pub use cache::{Cache, CacheStrategy};
pub use engine::{PutOutcome, StorageEngine, TOMBSTONE};
pub use error::{Result, StorageError};
pub use log::DurableLog;
