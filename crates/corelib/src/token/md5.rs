//! 128-bit MD5 token implementation.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// MD5 digest read as a big-endian unsigned 128-bit integer.
///
/// Keys and node endpoints hash into the same space, so a key token and a
/// node token are directly comparable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Md5Token(pub u128);

impl Md5Token {
    /// Hashes raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let digest = ::md5::compute(data);
        Md5Token(u128::from_be_bytes(digest.0))
    }
}

impl fmt::Display for Md5Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Md5Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Md5Token)
            .map_err(|e| Error::InvalidToken(format!("{s:?}: {e}")))
    }
}
