//! End-of-message delimiter framing (NETCONF 1.0, RFC 6242 §4.3).
//!
//! Every XML document on the wire is followed by the literal sequence
//! `]]>]]>`. There is no length prefix, so the reader accumulates bytes
//! until the delimiter shows up:
//!
//! ```text
//!  read #1          read #2                 read #3
//! ┌──────────────┐ ┌──────────────────────┐ ┌───────────────┐
//! │ <rpc-reply … │ │ …</rpc-reply>]]>]]><h│ │ ello>…]]>]]>  │
//! └──────────────┘ └──────────────────────┘ └───────────────┘
//!        document 1 ends here ──────┘   └── remainder kept for document 2
//! ```
//!
//! The chunked framing of NETCONF 1.1 is not implemented.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ncc::framing::{encode, read_message, FrameDecoder};
//!
//! writer.write_all(&encode("<hello/>")?).await?;
//!
//! let mut decoder = FrameDecoder::default();
//! let doc = read_message(&mut reader, &mut decoder, Duration::from_secs(30)).await?;
//! ```

mod decoder;
mod stream;

pub use decoder::FrameDecoder;
pub use stream::{read_message, wait_for_eof, write_message};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FramingError;

/// End-of-message delimiter.
pub const TERMINATOR: &[u8] = b"]]>]]>";

/// Default ceiling for a single buffered message (16 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Append the delimiter to a document.
///
/// Fails if the document already contains the delimiter, since the peer
/// would split it in two.
pub fn encode(document: &str) -> Result<Bytes, FramingError> {
    if find_terminator(document.as_bytes()).is_some() {
        return Err(FramingError::DelimiterInPayload);
    }

    let mut buf = BytesMut::with_capacity(document.len() + TERMINATOR.len());
    buf.put_slice(document.as_bytes());
    buf.put_slice(TERMINATOR);
    Ok(buf.freeze())
}

pub(crate) fn find_terminator(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(TERMINATOR.len())
        .position(|window| window == TERMINATOR)
}
