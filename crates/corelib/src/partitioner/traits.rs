//! Core partitioner trait definitions.

use crate::token::Token;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead.
pub trait Partitioner: Send + Sync + 'static {
    /// The token type produced by this partitioner.
    type TokenType: Token;

    /// Converts a key into a token.
    fn partition(&self, key: &[u8]) -> Self::TokenType;

    /// Ring position of the node listening on `address:port`.
    ///
    /// Hashes the address bytes followed by the port as a big-endian
    /// 4-byte integer.
    fn node_token(&self, address: &str, port: u16) -> Self::TokenType {
        let mut bytes = Vec::with_capacity(address.len() + 4);
        bytes.extend_from_slice(address.as_bytes());
        bytes.extend_from_slice(&u32::from(port).to_be_bytes());
        self.partition(&bytes)
    }
}
