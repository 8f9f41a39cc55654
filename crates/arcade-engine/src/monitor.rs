//! Online monitoring
//!
//! Steps arrive one at a time. The monitor keeps exactly one step of
//! lookback (the previous step's facts) plus one anchor per local
//! connector, and checks every rule touching `t` and `t.prev` as soon as
//! `t` arrives.
//!
//! Observing a step either completes or leaves the monitor unchanged:
//! findings and the next lookback state are computed first and committed
//! together at the end.

use std::collections::BTreeMap;
use std::sync::Arc;

use arcade_core::{InvocationId, Report, Rule, RuleSet, Severity, Step, Violation, ViolationClass};
use arcade_model::{Architecture, Invocation, StepFacts};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::connectivity::LocalAnchors;
use crate::{
    connectivity, lifecycle, structural, Findings, StepWindow, Validator, ValidatorConfig,
};

/// Running counters, readable while the monitor works
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStats {
    pub steps: u32,
    pub structural: u64,
    pub connectivity: u64,
    pub routing: u64,
    pub capability: u64,
    /// Findings that fail the verdict
    pub errors: u64,
}

impl MonitorStats {
    fn record(&mut self, violation: &Violation) {
        match violation.class() {
            ViolationClass::Structural => self.structural += 1,
            ViolationClass::Connectivity => self.connectivity += 1,
            ViolationClass::Routing => self.routing += 1,
            ViolationClass::Capability => self.capability += 1,
        }
        if violation.severity == Severity::Error {
            self.errors += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.structural + self.connectivity + self.routing + self.capability
    }
}

/// Result of a finished monitoring run
#[derive(Debug, Clone)]
pub struct MonitorSummary {
    pub stats: MonitorStats,
    /// History-scoped findings produced by `finish`
    pub report: Report,
}

impl MonitorSummary {
    /// No error-severity finding during the run or at its end
    pub fn passed(&self) -> bool {
        self.stats.errors == 0
    }
}

/// Incremental rule checker over a stream of step facts
pub struct OnlineMonitor {
    architecture: Architecture,
    invocations: BTreeMap<InvocationId, Invocation>,
    validator: Validator,
    previous: Option<StepFacts>,
    next_step: Step,
    anchors: LocalAnchors,
    stats: Arc<RwLock<MonitorStats>>,
}

impl OnlineMonitor {
    pub fn new(architecture: Architecture, config: ValidatorConfig) -> Self {
        OnlineMonitor {
            architecture,
            invocations: BTreeMap::new(),
            validator: Validator::new(config),
            previous: None,
            next_step: Step::ZERO,
            anchors: LocalAnchors::new(),
            stats: Arc::new(RwLock::new(MonitorStats::default())),
        }
    }

    /// Add or replace an invocation record. Timestamps must be known before
    /// the steps they name are observed.
    pub fn register(&mut self, invocation: Invocation) {
        self.invocations.insert(invocation.id, invocation);
    }

    pub fn invocation(&self, id: InvocationId) -> Option<&Invocation> {
        self.invocations.get(&id)
    }

    /// The step the next call to `observe` will check
    pub fn next_step(&self) -> Step {
        self.next_step
    }

    /// Shared handle to the running counters
    pub fn stats_handle(&self) -> Arc<RwLock<MonitorStats>> {
        Arc::clone(&self.stats)
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats.read().clone()
    }

    /// Check the next step and commit it as the new lookback
    pub fn observe(&mut self, facts: StepFacts) -> Vec<Violation> {
        let step = self.next_step;
        let rules = self.validator.config().rules;
        let mut out = Findings::new(rules);

        if step == Step::ZERO {
            // invocation coverage waits for `finish`, when the table is complete
            let mut statics = Findings::new(rules.without(Rule::PortInvocationCoverage));
            structural::check_static(&self.architecture, &self.invocations, &mut statics);
            for violation in statics.into_vec() {
                out.push(violation);
            }
        }

        let window = StepWindow {
            architecture: &self.architecture,
            invocations: &self.invocations,
            step,
            current: &facts,
            prev: self.previous.as_ref(),
        };
        structural::check_step(&window, &mut out);
        connectivity::check_step(&window, &mut out);
        lifecycle::check_step(&window, &mut out);
        let anchors = self.anchors.observe(&self.architecture, step, &facts, &mut out);
        let violations = out.into_vec();

        self.anchors = anchors;
        self.previous = Some(facts);
        self.next_step = step.succ();
        {
            let mut stats = self.stats.write();
            stats.steps += 1;
            for violation in &violations {
                stats.record(violation);
            }
        }

        for violation in &violations {
            warn!(%violation, "rule violated");
        }
        debug!(%step, violations = violations.len(), "step observed");
        violations
    }

    /// Run the history-scoped checks and close the run
    pub fn finish(self) -> MonitorSummary {
        let config = self.validator.config();
        let mut out = Findings::new(if config.rules.contains(Rule::PortInvocationCoverage) {
            RuleSet::empty().with(Rule::PortInvocationCoverage)
        } else {
            RuleSet::empty()
        });
        structural::check_static(&self.architecture, &self.invocations, &mut out);

        let mut ordering = Findings::new(config.rules);
        lifecycle::check_static(&self.invocations, &mut ordering);

        let mut report = Report::new();
        report.extend(out.into_vec());
        report.extend(ordering.into_vec());
        if config.rules.contains(Rule::Capability) {
            let severity = self.validator.capability_severity();
            report.extend(
                crate::type_checking(self.architecture.catalog(), &self.invocations)
                    .into_iter()
                    .map(|v| v.with_severity(severity)),
            );
        }
        report.sort();

        let stats = {
            let mut stats = self.stats.write();
            for violation in report.violations() {
                stats.record(violation);
            }
            stats.clone()
        };
        info!(
            steps = stats.steps,
            violations = stats.total(),
            errors = stats.errors,
            "monitor finished"
        );
        MonitorSummary { stats, report }
    }
}
