//! Incremental delimiter decoder.

use bytes::BytesMut;

use super::{find_terminator, DEFAULT_MAX_MESSAGE_BYTES, TERMINATOR};
use crate::error::FramingError;

/// Accumulates transport bytes and yields complete documents.
///
/// Bytes following a delimiter stay buffered for the next call to
/// [`FrameDecoder::decode`], so one decoder must be used for the whole
/// lifetime of a stream.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes received but not yet returned
    buf: BytesMut,
    /// Prefix of `buf` already known to hold no delimiter
    scanned: usize,
    /// Ceiling for a single document, delimiter excluded
    max_message_bytes: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

impl FrameDecoder {
    /// Create a decoder that refuses messages larger than `max_message_bytes`.
    pub fn new(max_message_bytes: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(8 * 1024),
            scanned: 0,
            max_message_bytes,
        }
    }

    /// Append bytes read from the transport.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet returned as a document.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Configured message ceiling.
    pub fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    /// Bytes that may still be buffered before the ceiling is crossed.
    ///
    /// Leaves room for the delimiter, and is at least one so a reader
    /// always makes progress towards either a document or an error.
    pub fn remaining_capacity(&self) -> usize {
        (self.max_message_bytes + TERMINATOR.len())
            .saturating_sub(self.buf.len())
            .max(1)
    }

    /// Pop the next complete document, if the buffer holds one.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    pub fn decode(&mut self) -> Result<Option<String>, FramingError> {
        // A delimiter may straddle the previous scan boundary.
        let start = self.scanned.saturating_sub(TERMINATOR.len() - 1);

        match find_terminator(&self.buf[start..]) {
            Some(offset) => {
                let end = start + offset;
                if end > self.max_message_bytes {
                    return Err(FramingError::MessageTooLarge {
                        limit: self.max_message_bytes,
                        buffered: end,
                    });
                }
                let frame = self.buf.split_to(end + TERMINATOR.len());
                self.scanned = 0;

                let document = std::str::from_utf8(&frame[..end])?;
                Ok(Some(document.to_string()))
            },
            None => {
                self.scanned = self.buf.len();
                // Up to a partial delimiter may trail a document at the ceiling.
                if self.buf.len() > self.max_message_bytes + TERMINATOR.len() - 1 {
                    return Err(FramingError::MessageTooLarge {
                        limit: self.max_message_bytes,
                        buffered: self.buf.len(),
                    });
                }
                Ok(None)
            },
        }
    }
}
