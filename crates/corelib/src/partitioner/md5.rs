//! MD5 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::md5::Md5Token;

/// MD5 partitioner producing 128-bit tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Md5Partitioner;

impl Partitioner for Md5Partitioner {
    type TokenType = Md5Token;

    fn partition(&self, key: &[u8]) -> Self::TokenType {
        Md5Token::from_bytes(key)
    }
}
