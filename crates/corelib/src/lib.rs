//! Core library for the partitioned key-value store.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Token types (128-bit MD5 positions)
//! - Partitioner turning keys and node endpoints into tokens
//! - Node descriptors
//! - The hash ring: ownership, successor/predecessor and replica lookup,
//!   plus the flat string form distributed to nodes and clients

pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;

pub use error::{Error, Result};
pub use node::{Node, NodeId};
pub use partitioner::Partitioner;
pub use ring::{HashRing, Ring, RingBuilder};
pub use token::Token;
