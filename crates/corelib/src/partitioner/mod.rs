//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys and node endpoints into
//! tokens that can be placed on the hash ring.

pub mod md5;
pub mod traits;

pub use self::md5::Md5Partitioner;
pub use traits::Partitioner;
