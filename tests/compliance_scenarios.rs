//! Compliance evaluation over representative device configurations.

use ncc::compliance::{check_rules, find_rule, Verdict};
use ncc::{evaluate, BUILTIN_RULES};

#[test]
fn test_compliant_router() {
    let result = evaluate("ntp server 1.1.1.1\nno telnet\nhostname router1");

    assert!(result.is_compliant());
    assert_eq!(
        result.passed(),
        &[
            "NTP is enabled",
            "Telnet is disabled",
            "Hostname follows naming convention"
        ]
    );
    assert!(result.failed().is_empty());
}

#[test]
fn test_telnet_enabled_without_ntp() {
    let result = evaluate("telnet enabled\nhostname x");

    assert!(!result.is_compliant());
    assert_eq!(
        result.failed(),
        &["NTP is not configured", "Telnet is enabled - SECURITY VIOLATION"]
    );
    assert_eq!(result.passed(), &["Hostname follows naming convention"]);
}

#[test]
fn test_empty_configuration() {
    let result = evaluate("");

    assert!(!result.is_compliant());
    assert_eq!(result.passed(), &["Telnet is disabled"]);
    assert_eq!(result.failed().len(), 2);
    assert_eq!(result.total(), 3);
}

#[test]
fn test_xml_configuration() {
    let config = r#"<data xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <system>
    <clock><timezone-name>UTC</timezone-name></clock>
    <services><ssh/></services>
  </system>
</data>"#;

    let outcomes = check_rules(BUILTIN_RULES, config);
    assert!(outcomes.iter().all(|o| o.verdict == Verdict::Pass));
}

#[test]
fn test_mixed_case_keywords() {
    let result = evaluate("NTP SERVER 10.0.0.1\nNo Telnet\nHostName core-1");
    assert!(result.is_compliant());
}

#[test]
fn test_rule_lookup() {
    let telnet = find_rule("telnet").unwrap();
    assert!(telnet.passes("no telnet"));
    assert!(!telnet.passes("telnet"));
    assert!(find_rule("snmp").is_none());
}
