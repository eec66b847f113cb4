//! Rule evaluation.

use serde::{Deserialize, Serialize};

use super::rules::{Rule, BUILTIN_RULES};

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Rule satisfied
    Pass,
    /// Rule violated
    Fail,
}

/// One rule's verdict and the message it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    /// Rule name
    pub rule: &'static str,
    /// Verdict
    pub verdict: Verdict,
    /// Pass or fail message of the rule
    pub message: &'static str,
}

/// Result of evaluating a configuration.
///
/// Holds the pass and fail messages in catalog order. Every rule contributes
/// to exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    passed: Vec<String>,
    failed: Vec<String>,
}

impl ComplianceResult {
    /// Build from per-rule outcomes.
    pub fn from_outcomes(outcomes: &[RuleOutcome]) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            let list = match outcome.verdict {
                Verdict::Pass => &mut result.passed,
                Verdict::Fail => &mut result.failed,
            };
            list.push(outcome.message.to_string());
        }
        result
    }

    /// Messages of passed rules.
    pub fn passed(&self) -> &[String] {
        &self.passed
    }

    /// Messages of failed rules.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Number of rules evaluated.
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// All rules passed.
    pub fn is_compliant(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Evaluate every rule of `rules` against `config`, in order.
pub fn check_rules(rules: &[Rule], config: &str) -> Vec<RuleOutcome> {
    let lowered = config.to_lowercase();

    rules
        .iter()
        .map(|rule| {
            let (verdict, message) = if rule.passes(&lowered) {
                (Verdict::Pass, rule.pass_message)
            } else {
                (Verdict::Fail, rule.fail_message)
            };
            RuleOutcome {
                rule: rule.name,
                verdict,
                message,
            }
        })
        .collect()
}

/// Evaluate a caller-supplied catalog.
pub fn evaluate_with(rules: &[Rule], config: &str) -> ComplianceResult {
    ComplianceResult::from_outcomes(&check_rules(rules, config))
}

/// Evaluate the built-in catalog.
pub fn evaluate(config: &str) -> ComplianceResult {
    evaluate_with(BUILTIN_RULES, config)
}
