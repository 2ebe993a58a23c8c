//! Token abstraction module for consistent hashing.
//!
//! Tokens represent positions on the hash ring and must be comparable,
//! hashable, and thread-safe.

pub mod md5;
pub mod traits;

pub use self::md5::Md5Token;
pub use traits::Token;
