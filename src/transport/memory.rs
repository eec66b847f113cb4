//! In-process transport backed by `tokio::io::duplex`.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{duplex, split, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

use super::Transport;

/// Transport whose peer is the other end of an in-memory pipe.
#[derive(Debug)]
pub struct MemoryTransport {
    reader: ReadHalf<DuplexStream>,
    writer: WriteHalf<DuplexStream>,
    disconnected: bool,
}

impl MemoryTransport {
    /// Create a transport and the stream its peer talks on.
    ///
    /// `capacity` bounds the bytes buffered in each direction.
    pub fn pair(capacity: usize) -> (Self, DuplexStream) {
        let (local, remote) = duplex(capacity);
        (Self::new(local), remote)
    }

    /// Wrap one end of an existing duplex pipe.
    pub fn new(stream: DuplexStream) -> Self {
        let (reader, writer) = split(stream);
        Self {
            reader,
            writer,
            disconnected: false,
        }
    }

    /// Whether `disconnect` has run.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl Transport for MemoryTransport {
    type Reader = ReadHalf<DuplexStream>;
    type Writer = WriteHalf<DuplexStream>;

    fn reader(&mut self) -> &mut Self::Reader {
        &mut self.reader
    }

    fn writer(&mut self) -> &mut Self::Writer {
        &mut self.writer
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if !self.disconnected {
                // Peer may already be gone.
                let _ = self.writer.shutdown().await;
                self.disconnected = true;
            }
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
