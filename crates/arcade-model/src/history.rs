//! History - an arena of per-step snapshots over a fixed timeline
//!
//! A `History` is what every validator, monitor and query reads: the static
//! [`Architecture`], one [`StepFacts`] per step, and the invocation table.
//! Builder helpers record facts over step ranges; they refuse undeclared
//! entities but never enforce cardinality, which is the validator's job.

use std::collections::BTreeMap;

use arcade_core::{
    ArcadeError, ArcadeResult, ComponentId, ConnectorId, InvocationId, LinkId, NodeId, PortId,
    Step, Timeline,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Architecture, Catalog, Fabric, Invocation, StepFacts};

/// A complete time-indexed snapshot sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    timeline: Timeline,
    architecture: Architecture,
    steps: Vec<StepFacts>,
    #[serde(default)]
    invocations: BTreeMap<InvocationId, Invocation>,
}

impl History {
    /// Create a history of `len` empty steps
    pub fn new(architecture: Architecture, len: u32) -> ArcadeResult<Self> {
        let timeline = Timeline::new(len)?;
        Ok(History {
            timeline,
            architecture,
            steps: vec![StepFacts::new(); len as usize],
            invocations: BTreeMap::new(),
        })
    }

    /// Assemble a history from already-populated parts
    pub fn from_parts(
        architecture: Architecture,
        steps: Vec<StepFacts>,
        invocations: impl IntoIterator<Item = Invocation>,
    ) -> ArcadeResult<Self> {
        let len = u32::try_from(steps.len())
            .map_err(|_| ArcadeError::Ingest(format!("too many steps: {}", steps.len())))?;
        let timeline = Timeline::new(len)?;
        Ok(History {
            timeline,
            architecture,
            steps,
            invocations: invocations.into_iter().map(|inv| (inv.id, inv)).collect(),
        })
    }

    /// Check that the arena matches the timeline and that invocation keys
    /// match their records. Needed after deserialization.
    pub fn check_shape(&self) -> ArcadeResult<()> {
        if self.timeline.len() == 0 {
            return Err(ArcadeError::EmptyTimeline);
        }
        if self.steps.len() != self.timeline.len() as usize {
            return Err(ArcadeError::Ingest(format!(
                "timeline has {} steps but {} snapshots were supplied",
                self.timeline.len(),
                self.steps.len()
            )));
        }
        for (id, inv) in &self.invocations {
            if *id != inv.id {
                return Err(ArcadeError::Ingest(format!(
                    "invocation keyed {} records id {}",
                    id, inv.id
                )));
            }
            for step in [inv.invoked, inv.executed].into_iter().flatten() {
                self.timeline.check(step)?;
            }
        }
        Ok(())
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn catalog(&self) -> &Catalog {
        self.architecture.catalog()
    }

    /// Connector-level queries over the whole history
    pub fn fabric(&self) -> Fabric<'_> {
        Fabric::new(self)
    }

    /// Facts at `step`, `None` outside the timeline
    pub fn facts(&self, step: Step) -> Option<&StepFacts> {
        self.steps.get(step.index())
    }

    pub fn step(&self, step: Step) -> ArcadeResult<&StepFacts> {
        self.timeline.check(step)?;
        let len = self.arena_len();
        self.steps
            .get(step.index())
            .ok_or(ArcadeError::StepOutOfRange { step, len })
    }

    pub fn step_mut(&mut self, step: Step) -> ArcadeResult<&mut StepFacts> {
        self.timeline.check(step)?;
        let len = self.arena_len();
        self.steps
            .get_mut(step.index())
            .ok_or(ArcadeError::StepOutOfRange { step, len })
    }

    /// All steps in order
    pub fn steps(&self) -> impl Iterator<Item = (Step, &StepFacts)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, facts)| (Step(i as u32), facts))
    }

    fn steps_from_mut(&mut self, from: Step) -> ArcadeResult<&mut [StepFacts]> {
        self.timeline.check(from)?;
        let len = self.arena_len();
        self.steps
            .get_mut(from.index()..)
            .filter(|steps| !steps.is_empty())
            .ok_or(ArcadeError::StepOutOfRange { step: from, len })
    }

    /// Snapshots actually held; differs from the timeline only in a
    /// deserialized history that failed `check_shape`
    fn arena_len(&self) -> u32 {
        u32::try_from(self.steps.len()).unwrap_or(u32::MAX)
    }

    // --- topology and deployment -------------------------------------------------

    /// Host `component` on `node` at every step
    pub fn place(&mut self, component: ComponentId, node: NodeId) -> ArcadeResult<()> {
        self.place_from(component, node, Step::ZERO)
    }

    /// Move `component` to `node` from `from` onwards, evicting it elsewhere
    pub fn place_from(&mut self, component: ComponentId, node: NodeId, from: Step) -> ArcadeResult<()> {
        self.architecture.require_component(component)?;
        self.architecture.require_node(node)?;
        for facts in self.steps_from_mut(from)? {
            facts.topology.evict(component);
            facts.topology.host(node, component);
        }
        trace!(%component, %node, %from, "placed component");
        Ok(())
    }

    /// Make `component` use `port` at every step
    pub fn attach(&mut self, port: PortId, component: ComponentId) -> ArcadeResult<()> {
        self.attach_from(port, component, Step::ZERO)
    }

    /// Make `component` use `port` from `from` onwards
    pub fn attach_from(&mut self, port: PortId, component: ComponentId, from: Step) -> ArcadeResult<()> {
        self.architecture.require_component(component)?;
        self.architecture.require_port(port)?;
        for facts in self.steps_from_mut(from)? {
            facts.deployment.attach(component, port);
        }
        Ok(())
    }

    /// Stop `component` using `port` from `from` onwards
    pub fn detach_from(&mut self, port: PortId, component: ComponentId, from: Step) -> ArcadeResult<()> {
        for facts in self.steps_from_mut(from)? {
            facts.deployment.detach(component, port);
        }
        Ok(())
    }

    /// Join `nodes` with `link` at every step
    pub fn link(&mut self, link: LinkId, nodes: impl IntoIterator<Item = NodeId>) -> ArcadeResult<()> {
        self.architecture.require_link(link)?;
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        for node in &nodes {
            self.architecture.require_node(*node)?;
        }
        for facts in &mut self.steps {
            for node in &nodes {
                facts.topology.attach_link(link, *node);
            }
        }
        Ok(())
    }

    /// Remove `link` from `from` onwards
    pub fn cut_link_from(&mut self, link: LinkId, from: Step) -> ArcadeResult<()> {
        for facts in self.steps_from_mut(from)? {
            facts.topology.cut_link(link);
        }
        Ok(())
    }

    // --- invocations -------------------------------------------------------------

    pub fn invocation(&self, id: InvocationId) -> Option<&Invocation> {
        self.invocations.get(&id)
    }

    pub fn require_invocation(&self, id: InvocationId) -> ArcadeResult<&Invocation> {
        self.invocations
            .get(&id)
            .ok_or(ArcadeError::UnknownEntity(id.into()))
    }

    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.invocations.values()
    }

    /// The invocation table, keyed by id
    pub fn invocation_table(&self) -> &BTreeMap<InvocationId, Invocation> {
        &self.invocations
    }

    /// One past the largest id in use
    pub fn next_invocation_id(&self) -> InvocationId {
        self.invocations
            .keys()
            .next_back()
            .map(|id| InvocationId(id.0 + 1))
            .unwrap_or(InvocationId(0))
    }

    /// Add an invocation record. Timestamps must lie on the timeline.
    pub fn add_invocation(&mut self, invocation: Invocation) -> ArcadeResult<InvocationId> {
        for step in [invocation.invoked, invocation.executed].into_iter().flatten() {
            self.timeline.check(step)?;
        }
        let id = invocation.id;
        self.invocations.insert(id, invocation);
        Ok(id)
    }

    /// Stamp the step an invocation was executed at
    pub fn set_executed(&mut self, id: InvocationId, step: Step) -> ArcadeResult<()> {
        self.timeline.check(step)?;
        let inv = self
            .invocations
            .get_mut(&id)
            .ok_or(ArcadeError::UnknownEntity(id.into()))?;
        inv.executed = Some(step);
        Ok(())
    }

    // --- buffers -----------------------------------------------------------------

    /// Record that `connector` holds `invocation` at `step`
    pub fn record_buffered(
        &mut self,
        connector: ConnectorId,
        invocation: InvocationId,
        step: Step,
    ) -> ArcadeResult<()> {
        self.architecture.require_connector(connector)?;
        self.step_mut(step)?.buffers.insert(connector, invocation);
        Ok(())
    }

    /// Record that `connector` no longer holds `invocation` at `step`
    pub fn clear_buffered(
        &mut self,
        connector: ConnectorId,
        invocation: InvocationId,
        step: Step,
    ) -> ArcadeResult<()> {
        self.step_mut(step)?.buffers.remove(connector, invocation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectorSpec, PortSpec};

    fn small() -> History {
        let mut arch = Architecture::new();
        arch.add_node(NodeId::new(1));
        arch.add_node(NodeId::new(2));
        arch.add_link(LinkId::new(1));
        arch.add_component(ComponentId::new(1));
        arch.add_port(PortId::new(1), PortSpec::new());
        arch.add_connector(ConnectorId::new(1), ConnectorSpec::new(Some(PortId::new(1)), None))
            .unwrap();
        History::new(arch, 4).unwrap()
    }

    #[test]
    fn test_place_from_moves_component() {
        let mut history = small();
        let c = ComponentId::new(1);
        history.place(c, NodeId::new(1)).unwrap();
        history.place_from(c, NodeId::new(2), Step(2)).unwrap();

        assert_eq!(history.step(Step(1)).unwrap().topology.host_of(c), Some(NodeId::new(1)));
        assert_eq!(history.step(Step(2)).unwrap().topology.host_of(c), Some(NodeId::new(2)));
        assert_eq!(history.step(Step(3)).unwrap().topology.hosts_of(c).len(), 1);
    }

    #[test]
    fn test_undeclared_entities_rejected() {
        let mut history = small();
        assert!(matches!(
            history.place(ComponentId::new(9), NodeId::new(1)),
            Err(ArcadeError::UnknownEntity(_))
        ));
        assert!(matches!(
            history.attach(PortId::new(9), ComponentId::new(1)),
            Err(ArcadeError::UnknownEntity(_))
        ));
        assert!(matches!(
            history.record_buffered(ConnectorId::new(9), InvocationId::new(0), Step(0)),
            Err(ArcadeError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_step_out_of_range() {
        let history = small();
        assert!(history.step(Step(4)).is_err());
        assert!(history.facts(Step(4)).is_none());
    }

    #[test]
    fn test_short_arena_refused_not_panicking() {
        let mut value = serde_json::to_value(small()).unwrap();
        value["steps"].as_array_mut().unwrap().truncate(1);
        let mut short: History = serde_json::from_value(value).unwrap();

        assert!(short.check_shape().is_err());
        assert!(short.step(Step(0)).is_ok());
        assert!(matches!(
            short.step(Step(2)),
            Err(ArcadeError::StepOutOfRange { len: 1, .. })
        ));
        assert!(short.step_mut(Step(3)).is_err());
        assert!(short
            .place_from(ComponentId::new(1), NodeId::new(1), Step(2))
            .is_err());
        assert!(short.record_buffered(ConnectorId::new(1), InvocationId::new(0), Step(1)).is_err());
    }

    #[test]
    fn test_empty_timeline_not_deserialized() {
        let mut value = serde_json::to_value(small()).unwrap();
        value["timeline"]["len"] = serde_json::json!(0);
        value["steps"] = serde_json::json!([]);
        assert!(serde_json::from_value::<History>(value).is_err());
    }

    #[test]
    fn test_invocation_ids() {
        let mut history = small();
        assert_eq!(history.next_invocation_id(), InvocationId(0));
        history.add_invocation(Invocation::new(InvocationId(4))).unwrap();
        assert_eq!(history.next_invocation_id(), InvocationId(5));

        let mut late = Invocation::new(InvocationId(5));
        late.invoked = Some(Step(10));
        assert!(history.add_invocation(late).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_shape() {
        let mut history = small();
        history.place(ComponentId::new(1), NodeId::new(1)).unwrap();
        history.attach(PortId::new(1), ComponentId::new(1)).unwrap();
        history
            .record_buffered(ConnectorId::new(1), InvocationId::new(0), Step(1))
            .unwrap();

        let json = serde_json::to_string(&history).unwrap();
        let back: History = serde_json::from_str(&json).unwrap();
        assert!(back.check_shape().is_ok());
        assert_eq!(back, history);
    }
}
