//! NETCONF session protocol.
//!
//! Implements the client side of a NETCONF 1.0 session (RFC 6241) over the
//! end-of-message framing in [`crate::framing`].
//!
//! ## Message Flow
//!
//! ```text
//! Client                                  Device
//!    |                                      |
//!    |-------- <hello> (caps) ------------->|  Announce base:1.0
//!    |<------- <hello> (caps, session-id) --|  Peer capabilities
//!    |                                      |
//!    |-------- <rpc message-id="1"> ------->|  get-config running
//!    |<------- <rpc-reply message-id="1"> --|  Configuration data
//!    |                                      |
//!    |-------- <rpc message-id="2"> ------->|  close-session
//!    |<------- <rpc-reply><ok/> ------------|
//!    |<=========== channel EOF =============|
//! ```
//!
//! ## State Machine
//!
//! | State           | Description                        | Valid Transitions   |
//! |-----------------|------------------------------------|---------------------|
//! | `Created`       | Channel open, nothing sent         | → HandshakeSent     |
//! | `HandshakeSent` | Our hello sent, awaiting the peer  | → Ready, Closed     |
//! | `Ready`         | Requests allowed                   | → Closing, Closed   |
//! | `Closing`       | close-session in flight            | → Closed            |
//! | `Closed`        | Transport released                 | (terminal)          |
//!
//! Any framing or transport error moves the session straight to `Closed`.
//!
//! ## Message Identifiers
//!
//! Each session owns a counter starting at 1. Every request, including
//! `close-session`, takes the next value, and the reply must echo it.
//! A request that failed is never resent under the same identifier.

mod capabilities;
mod message;
mod session;

pub use capabilities::{Capabilities, Hello, BASE_1_0};
pub use message::{Datastore, MessageId, Operation, Rpc, RpcReply};
pub use session::{Session, SessionState, SessionStats, SessionTimeouts};

/// NETCONF base XML namespace
pub const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// SSH subsystem carrying NETCONF
pub const NETCONF_SUBSYSTEM: &str = "netconf";

/// IANA-assigned NETCONF-over-SSH port
pub const DEFAULT_PORT: u16 = 830;

/// Shorten a document for error messages.
pub(crate) fn excerpt(document: &str) -> String {
    const MAX_CHARS: usize = 80;

    let trimmed = document.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_CHARS).collect();
        format!("{head}...")
    }
}
