//! Step windows - the unit every per-step rule is evaluated on
//!
//! A rule touching step `t` may look at `t` and `t.prev`, nothing else.
//! Batch validation builds a window per step from the history arena; the
//! online monitor builds one from the step that just arrived and the single
//! step it retains.

use std::collections::BTreeMap;

use arcade_core::{InvocationId, Rule, RuleSet, Step, Violation};
use arcade_model::{Architecture, History, Invocation, StepFacts};

/// Facts visible to a per-step rule
#[derive(Clone, Copy)]
pub struct StepWindow<'a> {
    pub architecture: &'a Architecture,
    pub invocations: &'a BTreeMap<InvocationId, Invocation>,
    pub step: Step,
    pub current: &'a StepFacts,
    /// `t.prev`, absent at the first step
    pub prev: Option<&'a StepFacts>,
}

impl<'a> StepWindow<'a> {
    /// Window over `step` of a complete history
    pub fn of(history: &'a History, step: Step) -> Option<Self> {
        let current = history.facts(step)?;
        let prev = history.timeline().prev(step).and_then(|p| history.facts(p));
        Some(StepWindow {
            architecture: history.architecture(),
            invocations: history.invocation_table(),
            step,
            current,
            prev,
        })
    }

    #[inline]
    pub fn prev_step(&self) -> Option<Step> {
        self.prev.and(self.step.pred())
    }
}

/// Violation sink that drops findings of disabled rules
#[derive(Debug)]
pub struct Findings {
    rules: RuleSet,
    violations: Vec<Violation>,
}

impl Findings {
    pub fn new(rules: RuleSet) -> Self {
        Findings {
            rules,
            violations: Vec::new(),
        }
    }

    #[inline]
    pub fn enabled(&self, rule: Rule) -> bool {
        self.rules.contains(rule)
    }

    pub fn push(&mut self, violation: Violation) {
        if self.rules.contains(violation.rule) {
            self.violations.push(violation);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.violations
    }
}
