//! Batch validation of a complete history
//!
//! Passes run in a fixed order:
//!
//! 1. Structural (static, then every step). Any finding stops validation:
//!    the other rules assume hosting and ownership are well-defined.
//! 2. Routing statics, then connectivity and lifecycle at every step.
//! 3. History-wide: local connectors and TypeChecking.
//!
//! Every step is checked against a window of itself and its predecessor
//! only, so steps are independent of each other apart from that lookback.

use arcade_core::{Report, Rule, Severity, Step, Violation};
use arcade_model::History;
use tracing::{debug, info, warn};

use crate::{connectivity, lifecycle, structural, type_checking, Findings, StepWindow, ValidatorConfig};

/// Checks histories against the enabled rules
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Validator { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every enabled rule over `history`
    pub fn validate(&self, history: &History) -> Report {
        let mut report = self.check_structure(history);
        if report.has_structural() {
            warn!(
                violations = report.len(),
                "structural violations found, skipping remaining rules"
            );
            report.sort();
            return report;
        }

        let mut out = self.findings();
        lifecycle::check_static(history.invocation_table(), &mut out);
        for step in history.timeline().iter() {
            if let Some(window) = StepWindow::of(history, step) {
                connectivity::check_step(&window, &mut out);
                lifecycle::check_step(&window, &mut out);
            }
        }
        connectivity::check_local(history, &mut out);
        report.extend(out.into_vec());
        report.extend(self.capability(history));
        report.sort();

        if report.passed() {
            info!(
                steps = history.timeline().len(),
                warnings = report.len(),
                "history passed validation"
            );
        } else {
            warn!(violations = report.len(), "history failed validation");
        }
        report
    }

    /// Structural rules only. A non-empty result means the history is
    /// not a valid snapshot sequence.
    pub fn check_structure(&self, history: &History) -> Report {
        let mut out = self.findings();
        structural::check_static(history.architecture(), history.invocation_table(), &mut out);
        for step in history.timeline().iter() {
            if let Some(window) = StepWindow::of(history, step) {
                structural::check_step(&window, &mut out);
            }
        }
        debug!(violations = out.len(), "structural pass complete");
        let mut report = Report::new();
        report.extend(out.into_vec());
        report
    }

    /// Per-step rules at a single step, against its predecessor
    pub fn validate_step(&self, history: &History, step: Step) -> Report {
        let mut out = self.findings();
        if let Some(window) = StepWindow::of(history, step) {
            structural::check_step(&window, &mut out);
            connectivity::check_step(&window, &mut out);
            lifecycle::check_step(&window, &mut out);
        }
        let mut report = Report::new();
        report.extend(out.into_vec());
        report.sort();
        report
    }

    /// TypeChecking over the whole history, at the configured severity
    pub fn capability(&self, history: &History) -> Vec<Violation> {
        if !self.config.rules.contains(Rule::Capability) {
            return Vec::new();
        }
        let severity = self.capability_severity();
        type_checking(history.catalog(), history.invocation_table())
            .into_iter()
            .map(|v| v.with_severity(severity))
            .collect()
    }

    pub(crate) fn capability_severity(&self) -> Severity {
        if self.config.capability_is_fatal {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    fn findings(&self) -> Findings {
        Findings::new(self.config.rules)
    }
}
