//! Transport layer for NETCONF sessions.
//!
//! Provides the byte channel a [`crate::protocol::Session`] runs over:
//! - **SSH**: `netconf` subsystem channel on an SSH connection (RFC 6242)
//! - **Memory**: in-process duplex pipe for tests and offline tooling
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            protocol::Session            │
//! │          (Transport-Agnostic)           │
//! └──────────────────┬──────────────────────┘
//!                    │ reader() / writer()
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │  SshTransport   │ │ MemoryTransport │
//! │ (russh channel) │ │ (tokio duplex)  │
//! └─────────────────┘ └─────────────────┘
//! ```
//!
//! The read and write halves are independent: nothing written is flushed
//! by a read or vice versa, so callers sequence a write before the read
//! that expects its reply.

mod memory;
mod ssh;

pub use memory::MemoryTransport;
pub use ssh::SshTransport;

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

/// Bidirectional byte channel to a NETCONF peer.
pub trait Transport: Send {
    /// Inbound half.
    type Reader: AsyncRead + Unpin + Send;
    /// Outbound half.
    type Writer: AsyncWrite + Unpin + Send;

    /// Borrow the inbound half.
    fn reader(&mut self) -> &mut Self::Reader;

    /// Borrow the outbound half.
    fn writer(&mut self) -> &mut Self::Writer;

    /// Tear down the channel and the connection under it.
    ///
    /// Must be safe to call more than once.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Get the transport name for logging.
    fn name(&self) -> &'static str;
}
