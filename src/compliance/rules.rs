//! Built-in compliance rule catalog.
//!
//! Rules are plain descriptors; adding a rule means adding an entry to
//! [`BUILTIN_RULES`], never touching the evaluation loop.

/// A named predicate over configuration text.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Rule name
    pub name: &'static str,
    /// Short description for listings
    pub description: &'static str,
    /// Predicate over the lowercased configuration text
    pub check: fn(&str) -> bool,
    /// Message recorded when the rule passes
    pub pass_message: &'static str,
    /// Message recorded when the rule fails
    pub fail_message: &'static str,
}

impl Rule {
    /// Evaluate against text that is already lowercased.
    pub fn passes(&self, lowered: &str) -> bool {
        (self.check)(lowered)
    }
}

/// Built-in rules, in evaluation order.
pub static BUILTIN_RULES: &[Rule] = &[
    Rule {
        name: "ntp",
        description: "Time synchronisation (NTP or clock) is configured",
        check: ntp_configured,
        pass_message: "NTP is enabled",
        fail_message: "NTP is not configured",
    },
    Rule {
        name: "telnet",
        description: "Telnet is not enabled",
        check: telnet_disabled,
        pass_message: "Telnet is disabled",
        fail_message: "Telnet is enabled - SECURITY VIOLATION",
    },
    Rule {
        name: "hostname",
        description: "Device hostname follows the naming convention",
        check: hostname_configured,
        pass_message: "Hostname follows naming convention",
        fail_message: "Hostname does not follow naming convention",
    },
];

fn ntp_configured(config: &str) -> bool {
    config.contains("ntp") || config.contains("clock")
}

fn telnet_disabled(config: &str) -> bool {
    !config.contains("telnet") || config.contains("no telnet")
}

fn hostname_configured(config: &str) -> bool {
    config.contains("hostname") || config.contains("netconf")
}

/// Look up a built-in rule by name.
pub fn find_rule(name: &str) -> Option<&'static Rule> {
    BUILTIN_RULES.iter().find(|rule| rule.name == name)
}
