//! Bounded, newline-delimited frame reader.
//!
//! Bytes are pulled from the underlying stream until a `\n` arrives. Only
//! printable ASCII (`0x20..=0x7e`) is kept, so `\r` and other control bytes
//! vanish. A frame that grows past the limit is dropped as a whole; the
//! reader resynchronises at the next newline.

use crate::codec::DELIMITER;
use crate::error::{Result, StreamingError};
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::warn;

/// Upper bound on a single frame, after filtering.
pub const MAX_FRAME_LEN: usize = 128 * 1024;

pub struct FrameReader<R> {
    inner: BufReader<R>,
    buf: BytesMut,
    max_len: usize,
    overflowed: bool,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, MAX_FRAME_LEN)
    }

    pub fn with_limit(inner: R, max_len: usize) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: BytesMut::with_capacity(1024),
            max_len,
            overflowed: false,
        }
    }

    /// Next complete frame without its terminator.
    ///
    /// `Ok(None)` means the peer closed the stream; a partial frame left at
    /// that point is discarded.
    pub async fn next_frame(&mut self) -> Result<Option<String>> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                self.buf.clear();
                self.overflowed = false;
                return Ok(None);
            }

            let newline = available.iter().position(|&b| b == DELIMITER);
            let body = match newline {
                Some(i) => &available[..i],
                None => available,
            };
            for &byte in body.iter().filter(|b| (0x20..=0x7e).contains(*b)) {
                if self.buf.len() < self.max_len {
                    self.buf.put_u8(byte);
                } else {
                    self.overflowed = true;
                }
            }
            let consumed = newline.map_or(available.len(), |i| i + 1);
            self.inner.consume(consumed);

            if newline.is_some() {
                let frame = self.buf.split();
                if std::mem::take(&mut self.overflowed) {
                    warn!(limit = self.max_len, "dropping oversized frame");
                    return Err(StreamingError::FrameTooLarge {
                        limit: self.max_len,
                    });
                }
                // Filtered to printable ASCII above, so always valid UTF-8.
                return Ok(Some(String::from_utf8_lossy(&frame).into_owned()));
            }
        }
    }
}
