//! SSH transport using russh.
//!
//! Dials the device, authenticates with a password, opens a session channel
//! and requests the `netconf` subsystem. The channel is then exposed as a
//! plain async byte stream.
//!
//! Host keys are not verified: any server key is accepted and its
//! fingerprint is logged. Only use this against devices on a trusted path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{ChannelMsg, ChannelStream, Disconnect};
use russh_keys::key;
use tokio::io::{split, AsyncWriteExt, ReadHalf, WriteHalf};

use super::Transport;
use crate::config::ConnectionParameters;
use crate::error::ConnectionError;
use crate::protocol::NETCONF_SUBSYSTEM;

/// Client handler that accepts every server host key.
struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::debug!(
            fingerprint = %server_public_key.fingerprint(),
            "accepting unverified host key"
        );
        Ok(true)
    }
}

/// NETCONF subsystem channel over SSH.
pub struct SshTransport {
    handle: Handle<AcceptAnyHostKey>,
    reader: ReadHalf<ChannelStream<Msg>>,
    writer: WriteHalf<ChannelStream<Msg>>,
    address: String,
    disconnected: bool,
}

impl SshTransport {
    /// Connect and open the `netconf` subsystem.
    ///
    /// The whole sequence (dial, key exchange, authentication, channel and
    /// subsystem request) must finish within `params.connect_timeout`.
    pub async fn connect(params: &ConnectionParameters) -> Result<Self, ConnectionError> {
        tracing::warn!(
            address = %params.address,
            "SSH host key verification is disabled"
        );

        match tokio::time::timeout(params.connect_timeout, Self::establish(params)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::Timeout {
                addr: params.address.clone(),
                after: params.connect_timeout,
            }),
        }
    }

    async fn establish(params: &ConnectionParameters) -> Result<Self, ConnectionError> {
        let config = Arc::new(client::Config::default());

        let mut handle = client::connect(config, params.address.as_str(), AcceptAnyHostKey)
            .await
            .map_err(|e| ConnectionError::Dial {
                addr: params.address.clone(),
                reason: e.to_string(),
            })?;
        tracing::info!(address = %params.address, "SSH connection established");

        let authenticated = handle
            .authenticate_password(params.username.as_str(), params.password.as_str())
            .await
            .map_err(|e| ConnectionError::Dial {
                addr: params.address.clone(),
                reason: format!("authentication failed: {e}"),
            })?;
        if !authenticated {
            return Err(ConnectionError::AuthRejected(params.username.clone()));
        }

        let mut channel = handle
            .channel_open_session()
            .await
            .map_err(|e| ConnectionError::ChannelOpen(e.to_string()))?;

        channel
            .request_subsystem(true, NETCONF_SUBSYSTEM)
            .await
            .map_err(|e| ConnectionError::SubsystemRefused(e.to_string()))?;

        loop {
            match channel.wait().await {
                Some(ChannelMsg::Success) => break,
                Some(ChannelMsg::Failure) => {
                    return Err(ConnectionError::SubsystemRefused(format!(
                        "server refused subsystem '{NETCONF_SUBSYSTEM}'"
                    )))
                },
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(ConnectionError::SubsystemRefused(
                        "channel closed before subsystem reply".to_string(),
                    ))
                },
                Some(other) => {
                    tracing::trace!(message = ?other, "ignoring channel message before subsystem reply");
                },
            }
        }
        tracing::debug!(subsystem = NETCONF_SUBSYSTEM, "subsystem channel open");

        let (reader, writer) = split(channel.into_stream());

        Ok(Self {
            handle,
            reader,
            writer,
            address: params.address.clone(),
            disconnected: false,
        })
    }

    /// Address this transport is connected to.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Transport for SshTransport {
    type Reader = ReadHalf<ChannelStream<Msg>>;
    type Writer = WriteHalf<ChannelStream<Msg>>;

    fn reader(&mut self) -> &mut Self::Reader {
        &mut self.reader
    }

    fn writer(&mut self) -> &mut Self::Writer {
        &mut self.writer
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if self.disconnected {
                return;
            }
            self.disconnected = true;

            let _ = self.writer.shutdown().await;
            if let Err(e) = self
                .handle
                .disconnect(Disconnect::ByApplication, "", "en")
                .await
            {
                tracing::debug!(error = %e, "SSH disconnect failed");
            }
            tracing::debug!(address = %self.address, "SSH connection closed");
        })
    }

    fn name(&self) -> &'static str {
        "ssh"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn params(address: String, timeout: Duration) -> ConnectionParameters {
        ConnectionParameters {
            address,
            username: "netconf".to_string(),
            password: "netconf".to_string(),
            connect_timeout: timeout,
        }
    }

    #[tokio::test]
    async fn test_connect_refused_is_dial_error() {
        // Grab a free port, then release it so nothing is listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = SshTransport::connect(&params(addr.to_string(), Duration::from_secs(5))).await;
        assert!(matches!(result, Err(ConnectionError::Dial { .. })));
    }

    #[tokio::test]
    async fn test_connect_times_out_on_silent_server() {
        // Accepts TCP but never sends an SSH banner.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let result =
            SshTransport::connect(&params(addr.to_string(), Duration::from_millis(200))).await;
        match result {
            Err(ConnectionError::Timeout { after, .. }) => {
                assert_eq!(after, Duration::from_millis(200));
            },
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a silent server"),
        }
        drop(listener);
    }
}
