//! Random valid histories
//!
//! Components sit in a ring. Component `i` uses port `i`; connector `i`
//! takes calls in at port `i` and delivers them to port `i + 1`, so every
//! port is inbound of one connector and outbound of the one before it.
//! Interface `i` is required by port `i` and provided by port `i + 1`.
//! Every node shares one link, so components may migrate freely.
//!
//! Each port makes exactly one call, to its ring successor. Calls are
//! issued, sometimes forwarded one hop, and either executed or held to
//! the end of the timeline, all through the [`Router`]. The result
//! satisfies every rule of the default validator configuration.

use arcade_core::{
    ArcadeResult, Args, ComponentId, ConnectorId, InterfaceId, LinkId, MethodId, NodeId, PortId,
    Step,
};
use arcade_engine::{invoke, Router};
use arcade_model::{Architecture, ConnectorSpec, History, PortSpec};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generator configuration
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Number of nodes
    pub nodes: u64,
    /// Number of components, at least 2
    pub components: u64,
    /// Timeline length
    pub steps: u32,
    /// Probability a component migrates at a given step
    pub migrate_prob: f64,
    /// Probability a call is forwarded one hop before delivery
    pub forward_prob: f64,
    /// Probability a call is executed at all
    pub execute_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            nodes: 3,
            components: 6,
            steps: 10,
            migrate_prob: 0.1,
            forward_prob: 0.3,
            execute_prob: 0.8,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Small histories for quick tests
    pub fn light() -> Self {
        GeneratorConfig {
            nodes: 2,
            components: 3,
            steps: 5,
            migrate_prob: 0.1,
            forward_prob: 0.2,
            execute_prob: 0.7,
            seed: 42,
        }
    }

    /// Large histories for benchmarks
    pub fn heavy() -> Self {
        GeneratorConfig {
            nodes: 16,
            components: 64,
            steps: 200,
            migrate_prob: 0.05,
            forward_prob: 0.5,
            execute_prob: 0.9,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Seeded generator of valid histories
pub struct HistoryGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl HistoryGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        HistoryGenerator { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Port used by component `i`
    pub fn port(i: u64) -> PortId {
        PortId(i)
    }

    /// Connector taking calls in at port `i`
    pub fn connector(i: u64) -> ConnectorId {
        ConnectorId(i)
    }

    /// Generate the next history
    pub fn generate(&mut self) -> ArcadeResult<History> {
        let n = self.config.components.max(2);
        let nodes = self.config.nodes.max(1);
        let steps = self.config.steps.max(1);
        let succ = |i: u64| (i + 1) % n;

        let mut arch = Architecture::new();
        for node in 0..nodes {
            arch.add_node(NodeId(node));
        }
        arch.add_link(LinkId(0));
        for i in 0..n {
            arch.add_component(ComponentId(i));
            arch.add_interface(InterfaceId(i), [MethodId(i)]);
        }
        for i in 0..n {
            let prev = (i + n - 1) % n;
            arch.add_port(
                Self::port(i),
                PortSpec::new()
                    .requiring(InterfaceId(i))
                    .providing(InterfaceId(prev)),
            );
        }
        for i in 0..n {
            arch.add_connector(
                Self::connector(i),
                ConnectorSpec::between(Self::port(i), Self::port(succ(i))).reliable(),
            )?;
        }

        let mut history = History::new(arch, steps)?;
        history.link(LinkId(0), (0..nodes).map(NodeId))?;
        for i in 0..n {
            let component = ComponentId(i);
            history.place(component, NodeId(self.rng.gen_range(0..nodes)))?;
            history.attach(Self::port(i), component)?;
            for step in 1..steps {
                if self.rng.gen_bool(self.config.migrate_prob) {
                    let node = NodeId(self.rng.gen_range(0..nodes));
                    history.place_from(component, node, Step(step))?;
                }
            }
        }

        for i in 0..n {
            self.route_call(&mut history, i, succ(i), steps)?;
        }
        Ok(history)
    }

    fn route_call(&mut self, history: &mut History, caller: u64, callee: u64, steps: u32) -> ArcadeResult<()> {
        let invoked = self.rng.gen_range(0..steps);
        let id = invoke(
            history,
            Self::port(caller),
            [Self::port(callee)],
            MethodId(caller),
            Args::none(),
            Step(invoked),
        )?;

        let last = Step(steps - 1);
        let mut router = Router::new(history);
        router.issue(id)?;
        let mut held = invoked;
        if held + 1 < steps && self.rng.gen_bool(self.config.forward_prob) {
            // the next hop still names the callee port, as its inbound
            let at = self.rng.gen_range(held + 1..steps);
            router.forward(id, Self::connector(callee), Step(at))?;
            held = at;
        }
        if self.rng.gen_bool(self.config.execute_prob) {
            let at = self.rng.gen_range(held..steps);
            router.execute(id, Step(at))?;
        } else {
            router.hold(id, last)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_history() {
        let a = HistoryGenerator::new(GeneratorConfig::light()).generate().unwrap();
        let b = HistoryGenerator::new(GeneratorConfig::light()).generate().unwrap();
        assert_eq!(a, b);

        let c = HistoryGenerator::new(GeneratorConfig::light().with_seed(7))
            .generate()
            .unwrap();
        assert_eq!(c.timeline().len(), 5);
    }

    #[test]
    fn test_one_call_per_port() {
        let history = HistoryGenerator::new(GeneratorConfig::default()).generate().unwrap();
        assert_eq!(history.invocations().count(), 6);
        assert!(history.invocations().all(|inv| inv.invoked.is_some()));
    }
}
