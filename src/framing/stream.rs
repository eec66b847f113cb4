//! Deadline-bounded framed reads and writes over async byte streams.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};

use super::{encode, FrameDecoder};
use crate::error::FramingError;

const READ_CHUNK: usize = 8 * 1024;

/// Read the next complete document from `reader`.
///
/// Keeps reading until `decoder` yields a document, the stream ends, a read
/// fails, or `timeout` elapses. Bytes past the delimiter stay in `decoder`.
pub async fn read_message<R>(
    reader: &mut R,
    decoder: &mut FrameDecoder,
    timeout: Duration,
) -> Result<String, FramingError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        if let Some(document) = decoder.decode()? {
            tracing::trace!(bytes = document.len(), "decoded framed message");
            return Ok(document);
        }

        let want = decoder.remaining_capacity().min(READ_CHUNK);
        let n = match timeout_at(deadline, reader.read(&mut chunk[..want])).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(FramingError::Io(e)),
            Err(_) => {
                return Err(FramingError::Timeout {
                    after: timeout,
                    buffered: decoder.buffered(),
                })
            },
        };

        if n == 0 {
            return Err(FramingError::UnexpectedEof {
                buffered: decoder.buffered(),
            });
        }

        decoder.extend(&chunk[..n]);
    }
}

/// Frame `document` and write it, flushing before returning.
pub async fn write_message<W>(
    writer: &mut W,
    document: &str,
    timeout: Duration,
) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let frame = encode(document)?;

    let write = async {
        writer.write_all(&frame).await?;
        writer.flush().await
    };

    match tokio::time::timeout(timeout, write).await {
        Ok(result) => result.map_err(FramingError::Io),
        Err(_) => Err(FramingError::WriteTimeout {
            after: timeout,
            bytes: frame.len(),
        }),
    }
}

/// Discard input until the peer closes the stream.
///
/// Returns the number of bytes discarded.
pub async fn wait_for_eof<R>(reader: &mut R, timeout: Duration) -> Result<usize, FramingError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut discarded = 0;

    loop {
        match timeout_at(deadline, reader.read(&mut chunk)).await {
            Ok(Ok(0)) => return Ok(discarded),
            Ok(Ok(n)) => discarded += n,
            Ok(Err(e)) => return Err(FramingError::Io(e)),
            Err(_) => {
                return Err(FramingError::Timeout {
                    after: timeout,
                    buffered: discarded,
                })
            },
        }
    }
}
