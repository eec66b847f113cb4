//! NETCONF compliance checker error types.
//!
//! # Error Classification
//!
//! | Error             | Fatal | Raised by                                        |
//! |-------------------|-------|--------------------------------------------------|
//! | `ConnectionError` | yes   | dial, authentication, subsystem request          |
//! | `SessionError`    | yes   | handshake, message-id mismatch, wrong state      |
//! | `FramingError`    | yes   | missing delimiter, buffer ceiling, stream closed |
//! | `CloseWarning`    | no    | peer did not acknowledge `<close-session/>`      |
//!
//! Fatal errors abort a run before any compliance result exists. A
//! [`CloseWarning`] is returned on its own, outside of [`NccError`], so a
//! result computed before teardown can never be replaced by it.

use std::time::Duration;

use thiserror::Error;

use crate::protocol::SessionState;

/// Top-level error for compliance runs.
#[derive(Error, Debug)]
pub enum NccError {
    /// Could not reach or authenticate against the device.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// NETCONF session protocol violation.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// End-of-message framing failed.
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for compliance checker operations
pub type Result<T> = std::result::Result<T, NccError>;

impl From<toml::de::Error> for NccError {
    fn from(err: toml::de::Error) -> Self {
        NccError::Config(err.to_string())
    }
}

/// Failures establishing the SSH transport and the `netconf` subsystem.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Router address could not be parsed.
    #[error("Invalid router address '{0}'")]
    InvalidAddress(String),

    /// TCP dial or SSH key exchange failed.
    #[error("SSH dial to {addr} failed: {reason}")]
    Dial {
        /// Address that was dialed.
        addr: String,
        /// Underlying failure.
        reason: String,
    },

    /// Server refused the credentials.
    #[error("Authentication rejected for user '{0}'")]
    AuthRejected(String),

    /// Session channel could not be opened.
    #[error("Failed to open SSH channel: {0}")]
    ChannelOpen(String),

    /// Server refused or dropped the `netconf` subsystem request.
    #[error("Failed to request NETCONF subsystem: {0}")]
    SubsystemRefused(String),

    /// The connect sequence did not finish in time.
    #[error("Connecting to {addr} timed out after {after:?}")]
    Timeout {
        /// Address that was dialed.
        addr: String,
        /// Configured connect timeout.
        after: Duration,
    },
}

/// NETCONF session-level failures.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation is not valid in the current lifecycle state.
    #[error("Cannot {operation} in state {state:?}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the session was in.
        state: SessionState,
    },

    /// Capability exchange failed.
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Reply did not echo the request's message-id.
    #[error("Reply message-id {received:?} does not match request {expected}")]
    MessageIdMismatch {
        /// Message-id sent with the request.
        expected: String,
        /// Message-id found on the reply, if any.
        received: Option<String>,
    },

    /// Peer sent a document that is not a usable reply.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Peer answered with one or more `<rpc-error>` elements.
    #[error("RPC {message_id} failed: {}", .errors.join("; "))]
    RpcError {
        /// Message-id of the failed request.
        message_id: String,
        /// Error messages reported by the peer.
        errors: Vec<String>,
    },
}

/// End-of-message framing failures.
#[derive(Error, Debug)]
pub enum FramingError {
    /// Deadline expired before a complete message arrived.
    #[error("No end-of-message delimiter within {after:?} ({buffered} bytes buffered)")]
    Timeout {
        /// Deadline that elapsed.
        after: Duration,
        /// Bytes received without a delimiter.
        buffered: usize,
    },

    /// Deadline expired before an outgoing message was written and flushed.
    #[error("Writing a {bytes}-byte message did not finish within {after:?}")]
    WriteTimeout {
        /// Deadline that elapsed.
        after: Duration,
        /// Framed message size.
        bytes: usize,
    },

    /// Peer closed the stream mid-message or before sending one.
    #[error("Stream closed before end-of-message delimiter ({buffered} bytes buffered)")]
    UnexpectedEof {
        /// Bytes received without a delimiter.
        buffered: usize,
    },

    /// A document is larger than the ceiling.
    #[error("Message exceeds {limit} bytes ({buffered} bytes buffered)")]
    MessageTooLarge {
        /// Configured ceiling.
        limit: usize,
        /// Bytes buffered when the ceiling was hit.
        buffered: usize,
    },

    /// Outgoing document contains the delimiter and cannot be framed.
    #[error("Document contains the end-of-message delimiter")]
    DelimiterInPayload,

    /// Message body is not UTF-8.
    #[error("Message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Transport read or write failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal teardown problem reported by `Session::close`.
#[derive(Error, Debug)]
pub enum CloseWarning {
    /// No acknowledgement within the grace period.
    #[error("Peer did not acknowledge close-session within {0:?}")]
    GracePeriodElapsed(Duration),

    /// Peer closed the channel without replying.
    #[error("Peer closed the channel without acknowledging close-session")]
    NotAcknowledged,

    /// Sending or reading the close exchange failed.
    #[error("Close-session exchange failed: {0}")]
    Exchange(String),
}

impl NccError {
    /// Whether this error came from the connect phase.
    pub fn is_connection(&self) -> bool {
        matches!(self, NccError::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NccError::from(SessionError::MessageIdMismatch {
            expected: "3".to_string(),
            received: Some("2".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "Session error: Reply message-id Some(\"2\") does not match request 3"
        );
    }

    #[test]
    fn test_rpc_error_joins_messages() {
        let err = SessionError::RpcError {
            message_id: "1".to_string(),
            errors: vec!["access denied".to_string(), "bad element".to_string()],
        };
        assert_eq!(err.to_string(), "RPC 1 failed: access denied; bad element");
    }

    #[test]
    fn test_connection_classification() {
        let err = NccError::from(ConnectionError::AuthRejected("netconf".to_string()));
        assert!(err.is_connection());

        let err = NccError::from(FramingError::UnexpectedEof { buffered: 0 });
        assert!(!err.is_connection());
    }
}
