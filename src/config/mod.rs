//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the `ncc` binary)
//!
//! Later sources override earlier ones: defaults, file, environment, flags.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectionError, NccError, Result};
use crate::protocol::{Datastore, SessionTimeouts, DEFAULT_PORT};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Device connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Session deadlines and limits
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            NccError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| NccError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`<config dir>/ncc/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ncc").join("config.toml"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply environment variable overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(address) = lookup("NCC_ROUTER_ADDRESS") {
            self.connection.router_address = address;
        }
        if let Some(username) = lookup("NCC_USERNAME") {
            self.connection.username = username;
        }
        if let Some(password) = lookup("NCC_PASSWORD") {
            self.connection.password = password;
        }
        if let Some(timeout) = lookup("NCC_CONNECT_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.connection.connect_timeout_secs = secs;
            } else {
                tracing::warn!(value = %timeout, "ignoring invalid NCC_CONNECT_TIMEOUT");
            }
        }
        self
    }
}

/// Device connection configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Router address (`host` or `host:port`)
    pub router_address: String,

    /// SSH username
    pub username: String,

    /// SSH password
    pub password: String,

    /// Dial + authentication + subsystem timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            router_address: format!("localhost:{DEFAULT_PORT}"),
            username: "netconf".to_string(),
            password: "netconf".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("router_address", &self.router_address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl ConnectionConfig {
    /// Validate and build connection parameters.
    pub fn parameters(&self) -> std::result::Result<ConnectionParameters, ConnectionError> {
        Ok(ConnectionParameters {
            address: normalize_address(&self.router_address)?,
            username: self.username.clone(),
            password: self.password.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        })
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds to wait for the device hello
    pub hello_timeout_secs: u64,

    /// Seconds to wait for each RPC reply
    pub rpc_timeout_secs: u64,

    /// Milliseconds to wait for close-session acknowledgement
    pub close_grace_ms: u64,

    /// Largest accepted message in bytes
    pub max_message_bytes: usize,

    /// Datastore whose configuration is audited
    pub datastore: Datastore,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let timeouts = SessionTimeouts::default();
        Self {
            hello_timeout_secs: timeouts.hello.as_secs(),
            rpc_timeout_secs: timeouts.rpc.as_secs(),
            close_grace_ms: timeouts.close_grace.as_millis() as u64,
            max_message_bytes: timeouts.max_message_bytes,
            datastore: Datastore::default(),
        }
    }
}

impl SessionConfig {
    /// Session deadlines.
    pub fn timeouts(&self) -> SessionTimeouts {
        SessionTimeouts {
            hello: Duration::from_secs(self.hello_timeout_secs),
            rpc: Duration::from_secs(self.rpc_timeout_secs),
            close_grace: Duration::from_millis(self.close_grace_ms),
            max_message_bytes: self.max_message_bytes,
        }
    }
}

/// Validated, immutable parameters for one connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// `host:port`
    pub address: String,
    /// SSH username
    pub username: String,
    /// SSH password
    pub password: String,
    /// Deadline for the whole connect sequence
    pub connect_timeout: Duration,
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Add the default NETCONF port when the address has none.
///
/// Accepts `host`, `host:port`, `[v6]`, `[v6]:port` and bare IPv6 literals.
pub fn normalize_address(address: &str) -> std::result::Result<String, ConnectionError> {
    let address = address.trim();
    let invalid = || ConnectionError::InvalidAddress(address.to_string());

    if address.is_empty() {
        return Err(invalid());
    }

    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        return match tail {
            "" => Ok(format!("[{host}]:{DEFAULT_PORT}")),
            _ => {
                let port = tail.strip_prefix(':').ok_or_else(invalid)?;
                port.parse::<u16>().map_err(|_| invalid())?;
                Ok(address.to_string())
            },
        };
    }

    match address.matches(':').count() {
        0 => Ok(format!("{address}:{DEFAULT_PORT}")),
        1 => {
            let (host, port) = address.split_once(':').ok_or_else(invalid)?;
            if host.is_empty() {
                return Err(invalid());
            }
            port.parse::<u16>().map_err(|_| invalid())?;
            Ok(address.to_string())
        },
        _ => Ok(format!("[{address}]:{DEFAULT_PORT}")),
    }
}
