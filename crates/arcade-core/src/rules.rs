//! ARCADE Rule Catalogue
//!
//! The fixed set of structural and temporal invariants every time-indexed
//! architecture snapshot must satisfy. A history that breaks any enabled
//! rule is reported, never silently accepted.
//!
//! # Rule classes
//!
//! 1. **Structural** - static cardinality facts (hosting, ownership, coverage).
//!    Fatal for the snapshot: nothing else is meaningful until corrected.
//! 2. **Routing** - the invocation lifecycle (setup, execute, buffering window).
//! 3. **Connectivity** - connectors must be backed by a physical path.
//! 4. **Capability** - receivers must offer the invoked method.
//!
//! # Usage
//!
//! Checks append [`Violation`]s to a [`Report`]; nothing is thrown, so one
//! pass surfaces every problem.
//!
//! ```rust
//! use arcade_core::{ComponentId, Report, Rule, Step, Violation};
//!
//! let mut report = Report::new();
//! report.push(Violation::at(
//!     Rule::ComponentHosting,
//!     Step::new(0),
//!     ComponentId::new(1),
//!     "hosted by 0 nodes",
//! ));
//! assert!(!report.passed());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Entity, Step};

/// Violation taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationClass {
    Structural,
    Routing,
    Connectivity,
    Capability,
}

impl fmt::Display for ViolationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationClass::Structural => "structural",
            ViolationClass::Routing => "routing",
            ViolationClass::Connectivity => "connectivity",
            ViolationClass::Capability => "capability",
        };
        f.write_str(name)
    }
}

/// The rules of the architecture model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rule {
    /// S-1: every component is hosted by exactly one node at every step
    ComponentHosting = 0,
    /// S-2: every port is used by exactly one component at every step
    PortOwnership = 1,
    /// S-3: every interface is required by exactly one port and provided by exactly one port
    InterfaceBinding = 2,
    /// S-4: exactly one connector names each port inbound, exactly one outbound
    PortConnectorCoverage = 3,
    /// S-5: exactly one invocation has each port as caller, exactly one as receiver
    PortInvocationCoverage = 4,

    /// C-1: distinct components sharing a connector are co-located or linked
    ConnectorReachability = 5,
    /// C-2: a reliable connector never drops a component it connected
    ReliableConnector = 6,
    /// C-3: a local connector keeps everything it connects on one fixed node
    LocalConnector = 7,

    /// R-1: at its invoked step, an invocation is buffered by exactly one connector
    SetupBuffering = 8,
    /// R-2: the caller port is attached to exactly one connector, the one buffering
    SetupAttachment = 9,
    /// R-3: the invocation was not in that buffer at the previous step
    SetupFreshness = 10,
    /// R-4: an invocation that was never invoked is never buffered
    UnissuedBuffered = 11,
    /// R-5: execution requires issue, and never precedes it
    ExecuteOrdering = 12,
    /// R-6: at its executed step, an invocation is buffered by exactly one connector
    ExecuteBuffering = 13,
    /// R-7: the executing connector no longer holds it at the next step
    ExecuteRetirement = 14,
    /// R-8: never buffered before issue or after execution
    OutsideWindow = 15,
    /// R-9: while pending, some connector holds the invocation
    PendingUnlocatable = 16,

    /// T-1: every receiver of an invoked call offers the invoked method
    Capability = 17,
}

impl Rule {
    /// Stable rule code (e.g. "R-1")
    pub fn code(&self) -> &'static str {
        match self {
            Rule::ComponentHosting => "S-1",
            Rule::PortOwnership => "S-2",
            Rule::InterfaceBinding => "S-3",
            Rule::PortConnectorCoverage => "S-4",
            Rule::PortInvocationCoverage => "S-5",
            Rule::ConnectorReachability => "C-1",
            Rule::ReliableConnector => "C-2",
            Rule::LocalConnector => "C-3",
            Rule::SetupBuffering => "R-1",
            Rule::SetupAttachment => "R-2",
            Rule::SetupFreshness => "R-3",
            Rule::UnissuedBuffered => "R-4",
            Rule::ExecuteOrdering => "R-5",
            Rule::ExecuteBuffering => "R-6",
            Rule::ExecuteRetirement => "R-7",
            Rule::OutsideWindow => "R-8",
            Rule::PendingUnlocatable => "R-9",
            Rule::Capability => "T-1",
        }
    }

    /// Short rule name
    pub fn name(&self) -> &'static str {
        match self {
            Rule::ComponentHosting => "Component Hosting",
            Rule::PortOwnership => "Port Ownership",
            Rule::InterfaceBinding => "Interface Binding",
            Rule::PortConnectorCoverage => "Port Connector Coverage",
            Rule::PortInvocationCoverage => "Port Invocation Coverage",
            Rule::ConnectorReachability => "Connector Reachability",
            Rule::ReliableConnector => "Reliable Connector",
            Rule::LocalConnector => "Local Connector",
            Rule::SetupBuffering => "Setup Buffering",
            Rule::SetupAttachment => "Setup Attachment",
            Rule::SetupFreshness => "Setup Freshness",
            Rule::UnissuedBuffered => "Unissued Buffered",
            Rule::ExecuteOrdering => "Execute Ordering",
            Rule::ExecuteBuffering => "Execute Buffering",
            Rule::ExecuteRetirement => "Execute Retirement",
            Rule::OutsideWindow => "Outside Window",
            Rule::PendingUnlocatable => "Pending Unlocatable",
            Rule::Capability => "Capability",
        }
    }

    pub fn class(&self) -> ViolationClass {
        match self {
            Rule::ComponentHosting
            | Rule::PortOwnership
            | Rule::InterfaceBinding
            | Rule::PortConnectorCoverage
            | Rule::PortInvocationCoverage => ViolationClass::Structural,
            Rule::ConnectorReachability | Rule::ReliableConnector | Rule::LocalConnector => {
                ViolationClass::Connectivity
            }
            Rule::Capability => ViolationClass::Capability,
            _ => ViolationClass::Routing,
        }
    }

    /// Get all rules
    pub fn all() -> &'static [Rule] {
        &[
            Rule::ComponentHosting,
            Rule::PortOwnership,
            Rule::InterfaceBinding,
            Rule::PortConnectorCoverage,
            Rule::PortInvocationCoverage,
            Rule::ConnectorReachability,
            Rule::ReliableConnector,
            Rule::LocalConnector,
            Rule::SetupBuffering,
            Rule::SetupAttachment,
            Rule::SetupFreshness,
            Rule::UnissuedBuffered,
            Rule::ExecuteOrdering,
            Rule::ExecuteBuffering,
            Rule::ExecuteRetirement,
            Rule::OutsideWindow,
            Rule::PendingUnlocatable,
            Rule::Capability,
        ]
    }

    #[inline]
    fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.name())
    }
}

/// A set of enabled rules
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSet(u32);

impl RuleSet {
    pub fn empty() -> Self {
        RuleSet(0)
    }

    pub fn all() -> Self {
        Rule::all().iter().fold(RuleSet::empty(), |set, &r| set.with(r))
    }

    pub fn with(self, rule: Rule) -> Self {
        RuleSet(self.0 | rule.bit())
    }

    pub fn without(self, rule: Rule) -> Self {
        RuleSet(self.0 & !rule.bit())
    }

    #[inline]
    pub fn contains(&self, rule: Rule) -> bool {
        self.0 & rule.bit() != 0
    }

    /// Enabled rules of one class
    pub fn of_class(&self, class: ViolationClass) -> impl Iterator<Item = Rule> + '_ {
        Rule::all()
            .iter()
            .copied()
            .filter(move |r| r.class() == class && self.contains(*r))
    }

    pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ {
        Rule::all().iter().copied().filter(move |r| self.contains(*r))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::all()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|r| r.code())).finish()
    }
}

/// Whether a finding fails the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A single rule breach: which rule, when, and who
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: Rule,
    /// Step the breach was observed at; `None` for static and history-wide rules
    pub step: Option<Step>,
    /// Offending entity
    pub subject: Entity,
    pub context: String,
    pub severity: Severity,
}

impl Violation {
    /// A breach observed at a specific step
    pub fn at(rule: Rule, step: Step, subject: impl Into<Entity>, context: impl Into<String>) -> Self {
        Violation {
            rule,
            step: Some(step),
            subject: subject.into(),
            context: context.into(),
            severity: Severity::Error,
        }
    }

    /// A breach of a static or history-wide rule
    pub fn timeless(rule: Rule, subject: impl Into<Entity>, context: impl Into<String>) -> Self {
        Violation {
            rule,
            step: None,
            subject: subject.into(),
            context: context.into(),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[inline]
    pub fn class(&self) -> ViolationClass {
        self.rule.class()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "[{}] {} at {}: {}", self.rule, self.subject, step, self.context),
            None => write!(f, "[{}] {}: {}", self.rule, self.subject, self.context),
        }
    }
}

/// Itemized result of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    /// Pass/fail verdict: no error-severity violation
    pub fn passed(&self) -> bool {
        self.violations.iter().all(|v| v.severity == Severity::Warning)
    }

    /// No findings at all, warnings included
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn by_class(&self, class: ViolationClass) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.class() == class)
    }

    pub fn by_rule(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    pub fn has(&self, rule: Rule) -> bool {
        self.by_rule(rule).next().is_some()
    }

    pub fn has_structural(&self) -> bool {
        self.by_class(ViolationClass::Structural).next().is_some()
    }

    /// Order by step, then rule, then subject
    pub fn sort(&mut self) {
        self.violations
            .sort_by(|a, b| (a.step, a.rule, a.subject).cmp(&(b.step, b.rule, b.subject)));
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "no violations");
        }
        writeln!(f, "{} violation(s):", self.violations.len())?;
        for v in &self.violations {
            writeln!(f, "  {}", v)?;
        }
        Ok(())
    }
}
