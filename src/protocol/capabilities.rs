//! Capability announcements exchanged in the `<hello>` handshake.

use lazy_static::lazy_static;
use regex::Regex;

use super::BASE_NAMESPACE;
use crate::error::SessionError;

/// NETCONF base protocol 1.0 capability.
pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";

lazy_static! {
    static ref HELLO_OPEN: Regex =
        Regex::new(r"<(?:[\w.-]+:)?hello\b[^>]*>").expect("valid regex");
    static ref CAPABILITY: Regex =
        Regex::new(r"(?s)<(?:[\w.-]+:)?capability\b[^>]*>(.*?)</(?:[\w.-]+:)?capability\s*>")
            .expect("valid regex");
    static ref SESSION_ID: Regex =
        Regex::new(r"(?s)<(?:[\w.-]+:)?session-id\b[^>]*>\s*(\d+)\s*</(?:[\w.-]+:)?session-id\s*>")
            .expect("valid regex");
}

/// Ordered set of capability URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    uris: Vec<String>,
}

impl Capabilities {
    /// Capabilities announced by this client: base 1.0 only, since the
    /// 1.1 chunked framing is not supported.
    pub fn client() -> Self {
        Self::from_uris([BASE_1_0])
    }

    /// Build from a list of URIs, dropping duplicates.
    pub fn from_uris<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut caps = Self::default();
        for uri in uris {
            let uri = uri.into();
            if !caps.uris.contains(&uri) {
                caps.uris.push(uri);
            }
        }
        caps
    }

    /// Check whether a capability is announced, ignoring any `?query`
    /// parameters on the announced URI.
    pub fn supports(&self, uri: &str) -> bool {
        self.uris
            .iter()
            .any(|announced| announced.split('?').next() == Some(uri))
    }

    /// Iterate over announced URIs.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.uris.iter().map(String::as_str)
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// No capabilities announced.
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

/// A `<hello>` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    /// Announced capabilities
    pub capabilities: Capabilities,
    /// Session ID assigned by the server (absent in client hellos)
    pub session_id: Option<u32>,
}

impl Hello {
    /// Client hello with the given capabilities.
    pub fn client(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            session_id: None,
        }
    }

    /// Render as an XML document (without delimiter).
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<hello xmlns="{BASE_NAMESPACE}">"#));
        xml.push_str("\n  <capabilities>\n");
        for uri in self.capabilities.iter() {
            xml.push_str(&format!("    <capability>{uri}</capability>\n"));
        }
        xml.push_str("  </capabilities>\n");
        if let Some(id) = self.session_id {
            xml.push_str(&format!("  <session-id>{id}</session-id>\n"));
        }
        xml.push_str("</hello>");
        xml
    }

    /// Parse a peer's hello document.
    pub fn parse(document: &str) -> Result<Self, SessionError> {
        if !HELLO_OPEN.is_match(document) {
            return Err(SessionError::Handshake(format!(
                "expected <hello>, got: {}",
                super::excerpt(document)
            )));
        }

        let capabilities = Capabilities::from_uris(
            CAPABILITY
                .captures_iter(document)
                .map(|c| c[1].trim().to_string())
                .filter(|uri| !uri.is_empty()),
        );

        if capabilities.is_empty() {
            return Err(SessionError::Handshake(
                "peer hello announces no capabilities".to_string(),
            ));
        }

        let session_id = match SESSION_ID.captures(document) {
            Some(c) => Some(c[1].parse::<u32>().map_err(|e| {
                SessionError::Handshake(format!("invalid session-id '{}': {e}", &c[1]))
            })?),
            None => None,
        };

        Ok(Self {
            capabilities,
            session_id,
        })
    }
}
