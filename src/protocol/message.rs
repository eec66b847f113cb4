//! `<rpc>` requests and `<rpc-reply>` parsing.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::BASE_NAMESPACE;
use crate::error::SessionError;

lazy_static! {
    static ref REPLY_OPEN: Regex =
        Regex::new(r"<(?:[\w.-]+:)?rpc-reply\b([^>]*?)(/?)>").expect("valid regex");
    static ref REPLY_CLOSE: Regex =
        Regex::new(r"</(?:[\w.-]+:)?rpc-reply\s*>").expect("valid regex");
    static ref MESSAGE_ID_ATTR: Regex =
        Regex::new(r#"\bmessage-id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex");
    static ref RPC_ERROR: Regex =
        Regex::new(r"(?s)<(?:[\w.-]+:)?rpc-error\b[^>]*>(.*?)</(?:[\w.-]+:)?rpc-error\s*>")
            .expect("valid regex");
    static ref ERROR_MESSAGE: Regex = Regex::new(
        r"(?s)<(?:[\w.-]+:)?error-message\b[^>]*>(.*?)</(?:[\w.-]+:)?error-message\s*>"
    )
    .expect("valid regex");
    static ref ERROR_TAG: Regex =
        Regex::new(r"(?s)<(?:[\w.-]+:)?error-tag\b[^>]*>(.*?)</(?:[\w.-]+:)?error-tag\s*>")
            .expect("valid regex");
    static ref OK: Regex = Regex::new(r"<(?:[\w.-]+:)?ok\s*/>").expect("valid regex");
    static ref DATA: Regex =
        Regex::new(r"(?s)<(?:[\w.-]+:)?data\b[^>]*?(?:/>|>(.*)</(?:[\w.-]+:)?data\s*>)")
            .expect("valid regex");
}

/// Per-session request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    /// First identifier issued by a session.
    pub const FIRST: MessageId = MessageId(1);

    /// Wrap a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Identifier following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration datastores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    /// Currently active configuration
    #[default]
    Running,
    /// Candidate configuration (`:candidate` capability)
    Candidate,
    /// Startup configuration (`:startup` capability)
    Startup,
}

impl Datastore {
    /// XML element name.
    pub fn element(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Candidate => "candidate",
            Self::Startup => "startup",
        }
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

impl std::str::FromStr for Datastore {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "candidate" => Ok(Self::Candidate),
            "startup" => Ok(Self::Startup),
            _ => Err(format!("Unknown datastore: {s}")),
        }
    }
}

/// Read-only protocol operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `<get-config>` on a datastore
    GetConfig {
        /// Datastore to read
        source: Datastore,
    },
    /// `<close-session/>`
    CloseSession,
}

impl Operation {
    /// Operation name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetConfig { .. } => "get-config",
            Self::CloseSession => "close-session",
        }
    }

    fn to_xml(&self) -> String {
        match self {
            Self::GetConfig { source } => format!(
                "<get-config>\n    <source>\n      <{}/>\n    </source>\n  </get-config>",
                source.element()
            ),
            Self::CloseSession => "<close-session/>".to_string(),
        }
    }
}

/// An outgoing `<rpc>` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rpc {
    /// Request identifier
    pub message_id: MessageId,
    /// Requested operation
    pub operation: Operation,
}

impl Rpc {
    /// Create a request.
    pub fn new(message_id: MessageId, operation: Operation) -> Self {
        Self {
            message_id,
            operation,
        }
    }

    /// Render as an XML document (without delimiter).
    pub fn to_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rpc message-id=\"{}\" xmlns=\"{BASE_NAMESPACE}\">\n  {}\n</rpc>",
            self.message_id,
            self.operation.to_xml()
        )
    }
}

/// A parsed `<rpc-reply>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    /// `message-id` attribute, if the peer sent one
    pub message_id: Option<String>,
    /// Inner XML of the `<rpc-reply>` element
    pub payload: String,
    /// Messages of any `<rpc-error>` elements
    pub errors: Vec<String>,
    /// Reply carries `<ok/>`
    pub ok: bool,
    /// The whole decoded document, envelope included
    pub document: String,
}

impl RpcReply {
    /// Parse a decoded document.
    pub fn parse(document: &str) -> Result<Self, SessionError> {
        let open = REPLY_OPEN.captures(document).ok_or_else(|| {
            SessionError::MalformedReply(format!(
                "expected <rpc-reply>, got: {}",
                super::excerpt(document)
            ))
        })?;

        let attributes = open.get(1).map_or("", |m| m.as_str());
        let message_id = MESSAGE_ID_ATTR.captures(attributes).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .map(|m| m.as_str().to_string())
        });

        let self_closing = open.get(2).is_some_and(|m| !m.as_str().is_empty());
        let payload = if self_closing {
            String::new()
        } else {
            let body_start = open.get(0).map_or(0, |m| m.end());
            let body = &document[body_start..];
            let close = REPLY_CLOSE.find_iter(body).last().ok_or_else(|| {
                SessionError::MalformedReply("unterminated <rpc-reply>".to_string())
            })?;
            body[..close.start()].to_string()
        };

        let errors = RPC_ERROR
            .captures_iter(&payload)
            .map(|c| {
                let error = &c[1];
                ERROR_MESSAGE
                    .captures(error)
                    .or_else(|| ERROR_TAG.captures(error))
                    .map_or_else(
                        || "unspecified rpc-error".to_string(),
                        |m| m[1].trim().to_string(),
                    )
            })
            .collect();

        let ok = OK.is_match(&payload);

        Ok(Self {
            message_id,
            payload,
            errors,
            ok,
            document: document.to_string(),
        })
    }

    /// Inner XML of the `<data>` element, when present.
    pub fn data(&self) -> Option<&str> {
        DATA.captures(&self.payload)
            .map(|c| c.get(1).map_or("", |m| m.as_str()))
    }

    /// Whether the reply echoes `id`.
    pub fn matches(&self, id: MessageId) -> bool {
        self.message_id.as_deref() == Some(id.to_string().as_str())
    }
}
