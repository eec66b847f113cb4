//! NETCONF client session.
//!
//! Owns the transport for its whole lifetime and drives the handshake,
//! request/reply correlation and teardown.

use std::time::Duration;

use tokio::time::Instant;

use super::capabilities::{Capabilities, Hello, BASE_1_0};
use super::message::{Datastore, MessageId, Operation, Rpc, RpcReply};
use crate::error::{CloseWarning, FramingError, NccError, Result, SessionError};
use crate::framing::{
    read_message, wait_for_eof, write_message, FrameDecoder, DEFAULT_MAX_MESSAGE_BYTES,
};
use crate::transport::Transport;

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Channel open, handshake not started
    Created,
    /// Local hello sent, waiting for the peer's hello
    HandshakeSent,
    /// Handshake complete, requests allowed
    Ready,
    /// close-session sent
    Closing,
    /// Transport released
    Closed,
}

/// Per-operation deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Waiting for the peer's hello
    pub hello: Duration,
    /// Writing a request and waiting for its reply
    pub rpc: Duration,
    /// Whole close-session exchange
    pub close_grace: Duration,
    /// Ceiling for a single buffered message
    pub max_message_bytes: usize,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            hello: Duration::from_secs(30),
            rpc: Duration::from_secs(30),
            close_grace: Duration::from_millis(500),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

/// NETCONF client session over a [`Transport`].
///
/// Dropping a session drops its transport, which releases the underlying
/// connection even when [`Session::close`] was never reached.
pub struct Session<T: Transport> {
    /// Byte channel to the device
    transport: T,
    /// Carries partial input between reads
    decoder: FrameDecoder,
    /// Deadlines
    timeouts: SessionTimeouts,
    /// Current state
    state: SessionState,
    /// Identifier for the next request
    next_id: MessageId,
    /// Capabilities we announce
    local_caps: Capabilities,
    /// Peer hello (after handshake)
    peer: Option<Hello>,
    /// Documents written
    messages_sent: u64,
    /// Documents read
    messages_received: u64,
}

impl<T: Transport> Session<T> {
    /// Create a session over an open transport.
    pub fn new(transport: T, timeouts: SessionTimeouts) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(timeouts.max_message_bytes),
            timeouts,
            state: SessionState::Created,
            next_id: MessageId::FIRST,
            local_caps: Capabilities::client(),
            peer: None,
            messages_sent: 0,
            messages_received: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if requests are allowed
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Capabilities announced by the peer.
    pub fn peer_capabilities(&self) -> Option<&Capabilities> {
        self.peer.as_ref().map(|hello| &hello.capabilities)
    }

    /// Session ID assigned by the peer.
    pub fn session_id(&self) -> Option<u32> {
        self.peer.as_ref().and_then(|hello| hello.session_id)
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchange hellos.
    ///
    /// Sends our capabilities, then reads and records the peer's. The peer
    /// must announce `base:1.0`, since that is the only framing we speak.
    pub async fn handshake(&mut self) -> Result<()> {
        if self.state != SessionState::Created {
            return Err(SessionError::InvalidState {
                operation: "handshake",
                state: self.state,
            }
            .into());
        }

        let hello = Hello::client(self.local_caps.clone()).to_xml();
        self.send(&hello).await?;
        self.state = SessionState::HandshakeSent;
        tracing::debug!(
            capabilities = self.local_caps.len(),
            "hello sent, waiting for peer"
        );

        let document = self.receive(self.timeouts.hello).await?;
        let peer = match Hello::parse(&document) {
            Ok(peer) => peer,
            Err(e) => return Err(self.fail(e).await),
        };

        if !peer.capabilities.supports(BASE_1_0) {
            let err = SessionError::Handshake(format!("peer does not announce {BASE_1_0}"));
            return Err(self.fail(err).await);
        }

        tracing::info!(
            session_id = ?peer.session_id,
            capabilities = peer.capabilities.len(),
            transport = self.transport.name(),
            "NETCONF session established"
        );
        for uri in peer.capabilities.iter() {
            tracing::debug!(capability = uri, "peer capability");
        }

        self.peer = Some(peer);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Send a request and wait for its reply.
    ///
    /// Fails with [`SessionError::InvalidState`] unless the session is
    /// `Ready`. A reply with a different message-id closes the session.
    pub async fn request(&mut self, operation: Operation) -> Result<RpcReply> {
        if self.state != SessionState::Ready {
            return Err(SessionError::InvalidState {
                operation: "send request",
                state: self.state,
            }
            .into());
        }

        let id = self.allocate_id();
        let rpc = Rpc::new(id, operation);
        tracing::debug!(message_id = %id, operation = rpc.operation.name(), "sending rpc");

        self.send(&rpc.to_xml()).await?;
        let document = self.receive(self.timeouts.rpc).await?;

        let reply = match RpcReply::parse(&document) {
            Ok(reply) => reply,
            Err(e) => return Err(self.fail(e).await),
        };

        if !reply.matches(id) {
            let err = SessionError::MessageIdMismatch {
                expected: id.to_string(),
                received: reply.message_id,
            };
            return Err(self.fail(err).await);
        }

        tracing::debug!(
            message_id = %id,
            bytes = reply.payload.len(),
            errors = reply.errors.len(),
            "received rpc-reply"
        );

        if !reply.errors.is_empty() {
            return Err(SessionError::RpcError {
                message_id: id.to_string(),
                errors: reply.errors,
            }
            .into());
        }

        Ok(reply)
    }

    /// Retrieve a datastore's configuration as reply text.
    ///
    /// Returns the whole `<rpc-reply>` document, so namespaces declared on
    /// the envelope stay visible to whatever inspects the text.
    pub async fn get_config(&mut self, source: Datastore) -> Result<String> {
        let reply = self.request(Operation::GetConfig { source }).await?;
        Ok(reply.document)
    }

    /// Close the session.
    ///
    /// Sends `<close-session/>` and waits up to the grace period for the
    /// `<ok/>` reply and the peer closing the channel. The transport is
    /// disconnected afterwards in every case. Calling this again is a no-op.
    pub async fn close(&mut self) -> std::result::Result<(), CloseWarning> {
        match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Ready => {},
            _ => {
                self.abort().await;
                return Ok(());
            },
        }

        self.state = SessionState::Closing;
        let id = self.allocate_id();
        let deadline = Instant::now() + self.timeouts.close_grace;

        let outcome = self.close_exchange(id, deadline).await;

        self.transport.disconnect().await;
        self.state = SessionState::Closed;
        tracing::debug!(message_id = %id, ok = outcome.is_ok(), "session closed");
        outcome
    }

    /// Release the transport without a close-session exchange.
    pub async fn abort(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            self.transport.disconnect().await;
        }
    }

    /// Get session statistics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.session_id(),
            state: self.state,
            messages_sent: self.messages_sent,
            messages_received: self.messages_received,
            next_message_id: self.next_id,
        }
    }

    async fn close_exchange(
        &mut self,
        id: MessageId,
        deadline: Instant,
    ) -> std::result::Result<(), CloseWarning> {
        let grace = self.timeouts.close_grace;
        let remaining = || deadline.saturating_duration_since(Instant::now());
        let to_warning = |err: FramingError| match err {
            FramingError::Timeout { .. } | FramingError::WriteTimeout { .. } => {
                CloseWarning::GracePeriodElapsed(grace)
            },
            FramingError::UnexpectedEof { buffered: 0 } => CloseWarning::NotAcknowledged,
            other => CloseWarning::Exchange(other.to_string()),
        };

        let rpc = Rpc::new(id, Operation::CloseSession).to_xml();
        write_message(self.transport.writer(), &rpc, remaining())
            .await
            .map_err(to_warning)?;
        self.messages_sent += 1;

        let document = read_message(self.transport.reader(), &mut self.decoder, remaining())
            .await
            .map_err(to_warning)?;
        self.messages_received += 1;

        let reply =
            RpcReply::parse(&document).map_err(|e| CloseWarning::Exchange(e.to_string()))?;
        if !reply.matches(id) {
            return Err(CloseWarning::Exchange(format!(
                "reply message-id {:?} does not match {id}",
                reply.message_id
            )));
        }
        if !reply.ok {
            let reason = if reply.errors.is_empty() {
                "reply without <ok/>".to_string()
            } else {
                reply.errors.join("; ")
            };
            return Err(CloseWarning::Exchange(reason));
        }

        match wait_for_eof(self.transport.reader(), remaining()).await {
            Ok(discarded) => tracing::debug!(discarded, "peer closed channel"),
            Err(e) => tracing::debug!(error = %e, "peer left channel open, forcing close"),
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    async fn send(&mut self, document: &str) -> Result<()> {
        match write_message(self.transport.writer(), document, self.timeouts.rpc).await {
            Ok(()) => {
                self.messages_sent += 1;
                Ok(())
            },
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn receive(&mut self, timeout: Duration) -> Result<String> {
        match read_message(self.transport.reader(), &mut self.decoder, timeout).await {
            Ok(document) => {
                self.messages_received += 1;
                Ok(document)
            },
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Move to `Closed` after a fatal error.
    async fn fail(&mut self, err: impl Into<NccError>) -> NccError {
        let err = err.into();
        if self.state != SessionState::Closed {
            tracing::warn!(state = ?self.state, error = %err, "session failed, closing transport");
            self.state = SessionState::Closed;
            self.transport.disconnect().await;
        }
        err
    }
}

/// Session statistics
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Peer-assigned session ID
    pub session_id: Option<u32>,
    /// Current state
    pub state: SessionState,
    /// Documents written
    pub messages_sent: u64,
    /// Documents read
    pub messages_received: u64,
    /// Identifier the next request will use
    pub next_message_id: MessageId,
}
