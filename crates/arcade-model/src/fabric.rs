//! Connector fabric queries over a whole history
//!
//! A connector's *connects* relation at a step is the set of components
//! using its inbound or outbound port. These queries look across steps.

use std::collections::BTreeSet;

use arcade_core::{ComponentId, ConnectorId, NodeId, Step};

use crate::History;

/// Read-only connector view over a [`History`]
#[derive(Clone, Copy)]
pub struct Fabric<'h> {
    history: &'h History,
}

impl<'h> Fabric<'h> {
    pub fn new(history: &'h History) -> Self {
        Fabric { history }
    }

    /// Components connected by `connector` at `step`; empty for unknown
    /// connectors or steps
    pub fn connects(&self, connector: ConnectorId, step: Step) -> BTreeSet<ComponentId> {
        match (
            self.history.architecture().connector(connector),
            self.history.facts(step),
        ) {
            (Some(spec), Some(facts)) => facts.connects(spec),
            _ => BTreeSet::new(),
        }
    }

    /// Whether `component` is on `connector` at some step
    pub fn ever_connects(&self, connector: ConnectorId, component: ComponentId) -> bool {
        self.history
            .timeline()
            .iter()
            .any(|step| self.connects(connector, step).contains(&component))
    }

    /// Whether two components are co-located or linked at `step`
    pub fn reachable(&self, a: ComponentId, b: ComponentId, step: Step) -> bool {
        self.history
            .facts(step)
            .is_some_and(|facts| facts.topology.reachable(a, b))
    }

    /// Once connected, a component stays connected: `connects(t) ⊆ connects(t.next)`
    pub fn is_reliable(&self, connector: ConnectorId) -> bool {
        self.first_dropped(connector).is_none()
    }

    /// First step whose successor lost a component, with the lost component
    pub fn first_dropped(&self, connector: ConnectorId) -> Option<(Step, ComponentId)> {
        let timeline = self.history.timeline();
        timeline.iter().find_map(|step| {
            let next = timeline.next(step)?;
            let later = self.connects(connector, next);
            self.connects(connector, step)
                .into_iter()
                .find(|c| !later.contains(c))
                .map(|c| (step, c))
        })
    }

    /// The single node hosting everything the connector connects, at every
    /// step. `None` when no declared node qualifies.
    pub fn local_anchor(&self, connector: ConnectorId) -> Option<NodeId> {
        let history = self.history;
        history.architecture().nodes().find(|&node| {
            history.steps().all(|(step, facts)| {
                let hosted: BTreeSet<ComponentId> = facts.topology.hosted_by(node).collect();
                self.connects(connector, step).is_subset(&hosted)
            })
        })
    }

    /// Every pair this connector ever connects resides on one fixed node
    pub fn is_local(&self, connector: ConnectorId) -> bool {
        self.local_anchor(connector).is_some()
    }

    /// Connectors that connect `a` at some step and `b` at some (possibly
    /// different) step
    pub fn get_connectors(&self, a: ComponentId, b: ComponentId) -> Vec<ConnectorId> {
        self.history
            .architecture()
            .connectors()
            .map(|(id, _)| id)
            .filter(|&id| self.ever_connects(id, a) && self.ever_connects(id, b))
            .collect()
    }
}
