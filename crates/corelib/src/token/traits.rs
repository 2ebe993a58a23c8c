//! Core token trait definitions.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Position on the hash ring.
///
/// Tokens are immutable, comparable and thread-safe. The `Display`/`FromStr`
/// pair is the textual form used in the serialized ring.
pub trait Token:
    Clone + Ord + Hash + Send + Sync + Debug + Display + FromStr + 'static
{
}

impl<T> Token for T where
    T: Clone + Ord + Hash + Send + Sync + Debug + Display + FromStr + 'static
{
}
