//! # NCC - NETCONF Compliance Checker
//!
//! Opens a NETCONF session to a network device over SSH, retrieves its
//! running configuration and audits it against a catalog of compliance
//! rules. Configuration is only ever read, never written.
//!
//! ## Protocol Overview
//!
//! ```text
//! ncc                               Device (port 830)
//!  |                                      |
//!  |====== SSH connect + password ======>|
//!  |------ subsystem "netconf" --------->|
//!  |                                      |
//!  |------ <hello> ]]>]]> --------------->|
//!  |<----- <hello> ]]>]]> ----------------|
//!  |------ <rpc id=1 get-config> -------->|
//!  |<----- <rpc-reply id=1> --------------|
//!  |------ <rpc id=2 close-session> ----->|
//!  |<----- <rpc-reply id=2><ok/> ---------|
//! ```
//!
//! Every document is terminated by the NETCONF 1.0 end-of-message
//! delimiter `]]>]]>`. The chunked framing of NETCONF 1.1 is not supported.
//!
//! ## Quick Start
//!
//! ### Offline Evaluation
//!
//! ```rust
//! use ncc::compliance::evaluate;
//!
//! let result = evaluate("telnet enabled\nhostname x");
//! assert!(!result.is_compliant());
//! assert_eq!(result.failed().len(), 2);
//! ```
//!
//! ### Live Check
//!
//! ```rust,ignore
//! use ncc::{run_check, Config, TracingReporter};
//!
//! let config = Config::from_env();
//! let result = run_check(&config, &TracingReporter).await?;
//! println!("compliant: {}", result.is_compliant());
//! ```
//!
//! ## Modules
//!
//! - [`transport`]: SSH and in-memory byte channels
//! - [`framing`]: `]]>]]>` message framing
//! - [`protocol`]: Session state machine, hellos, RPCs
//! - [`compliance`]: Rule catalog and evaluator
//! - [`report`]: Progress and outcome reporting
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod compliance;
pub mod config;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod transport;

// Re-exports for convenience
pub use compliance::{evaluate, ComplianceResult, Rule, BUILTIN_RULES};
pub use config::{Config, ConnectionParameters};
pub use error::{CloseWarning, ConnectionError, FramingError, NccError, Result, SessionError};
pub use protocol::{Capabilities, Datastore, Operation, RpcReply, Session, SessionState};
pub use report::{MemoryReporter, NullReporter, Reporter, TracingReporter};
pub use runner::{run_check, run_with_transport};
pub use transport::{MemoryTransport, SshTransport, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
