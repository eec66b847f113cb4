//! Configuration compliance evaluation.
//!
//! Evaluation is a pure function of the configuration text: no I/O, no
//! logging, no state between calls. Reporting lives in [`crate::report`].
//!
//! # Built-in Rules
//!
//! | Rule       | Passes when (case-insensitive)                 |
//! |------------|------------------------------------------------|
//! | `ntp`      | text contains `ntp` or `clock`                 |
//! | `telnet`   | text lacks `telnet`, or contains `no telnet`   |
//! | `hostname` | text contains `hostname` or `netconf`          |
//!
//! # Usage
//!
//! ```rust
//! use ncc::compliance::evaluate;
//!
//! let result = evaluate("ntp server 1.1.1.1\nno telnet\nhostname router1");
//! assert!(result.is_compliant());
//! assert_eq!(result.total(), 3);
//! ```

mod evaluator;
mod rules;

pub use evaluator::{
    check_rules, evaluate, evaluate_with, ComplianceResult, RuleOutcome, Verdict,
};
pub use rules::{find_rule, Rule, BUILTIN_RULES};
