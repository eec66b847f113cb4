//! Progress and outcome reporting.
//!
//! The runner announces progress through a [`Reporter`] instead of logging
//! directly, so runs can be observed in tests without capturing log output.

use std::sync::Mutex;

use crate::compliance::{ComplianceResult, RuleOutcome, Verdict};

/// Sink for progress and rule outcomes.
pub trait Reporter: Send + Sync {
    /// Progress message.
    fn info(&self, message: &str);
    /// A rule passed.
    fn pass(&self, message: &str);
    /// A rule failed.
    fn fail(&self, message: &str);
    /// Non-fatal problem.
    fn warn(&self, message: &str);
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("[INFO] {message}");
    }

    fn pass(&self, message: &str) {
        tracing::info!("[PASS] ✓ {message}");
    }

    fn fail(&self, message: &str) {
        tracing::error!("[FAIL] ✗ {message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("[WARN] {message}");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _message: &str) {}
    fn pass(&self, _message: &str) {}
    fn fail(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Kind of a recorded report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// Progress
    Info,
    /// Rule passed
    Pass,
    /// Rule failed
    Fail,
    /// Non-fatal problem
    Warn,
}

/// Keeps every report line in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<(ReportLevel, String)>>,
}

impl MemoryReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines, oldest first.
    pub fn events(&self) -> Vec<(ReportLevel, String)> {
        self.lock().clone()
    }

    /// Recorded messages of one level.
    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn record(&self, level: ReportLevel, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ReportLevel, String)>> {
        // A panic while holding the lock cannot leave the Vec inconsistent.
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.record(ReportLevel::Info, message);
    }

    fn pass(&self, message: &str) {
        self.record(ReportLevel::Pass, message);
    }

    fn fail(&self, message: &str) {
        self.record(ReportLevel::Fail, message);
    }

    fn warn(&self, message: &str) {
        self.record(ReportLevel::Warn, message);
    }
}

/// Report each rule outcome in order.
pub fn report_outcomes(reporter: &dyn Reporter, outcomes: &[RuleOutcome]) {
    for outcome in outcomes {
        match outcome.verdict {
            Verdict::Pass => reporter.pass(outcome.message),
            Verdict::Fail => reporter.fail(outcome.message),
        }
    }
}

/// Report the final banner and any failed rules.
pub fn report_summary(reporter: &dyn Reporter, result: &ComplianceResult) {
    const RULE: &str = "============================================";

    if result.is_compliant() {
        reporter.pass(RULE);
        reporter.pass("Compliance check successful!");
        reporter.pass(&format!("All {} rules passed", result.passed().len()));
        reporter.pass(RULE);
    } else {
        reporter.fail(RULE);
        reporter.fail("Compliance check failed!");
        reporter.fail(&format!(
            "{} rules passed, {} rule(s) failed",
            result.passed().len(),
            result.failed().len()
        ));
        reporter.fail(RULE);
        reporter.fail("Failed rules:");
        for rule in result.failed() {
            reporter.fail(&format!("  - {rule}"));
        }
    }
}
