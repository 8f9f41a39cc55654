//! Fault injection
//!
//! Each [`Fault`] breaks one rule in an otherwise valid history by editing
//! step facts directly, bypassing the router.

use arcade_core::{ArcadeResult, ComponentId, ConnectorId, InvocationId, Rule, Step};
use arcade_model::History;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A single injectable fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A second connector also buffers an invocation at its invoked step
    DuplicateEnqueue,
    /// An invocation is already buffered the step before it is invoked
    StaleBuffer,
    /// The executing connector still holds an invocation after executing it
    MissingRetirement,
    /// A component is hosted by no node at one step
    DropHost,
}

impl Fault {
    pub const ALL: [Fault; 4] = [
        Fault::DuplicateEnqueue,
        Fault::StaleBuffer,
        Fault::MissingRetirement,
        Fault::DropHost,
    ];

    /// Rule the validator must report once this fault is injected
    pub fn expected_rule(&self) -> Rule {
        match self {
            Fault::DuplicateEnqueue => Rule::SetupBuffering,
            Fault::StaleBuffer => Rule::SetupFreshness,
            Fault::MissingRetirement => Rule::ExecuteRetirement,
            Fault::DropHost => Rule::ComponentHosting,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fault::DuplicateEnqueue => "duplicate-enqueue",
            Fault::StaleBuffer => "stale-buffer",
            Fault::MissingRetirement => "missing-retirement",
            Fault::DropHost => "drop-host",
        };
        f.write_str(name)
    }
}

/// Seeded fault injector
pub struct FaultInjector {
    rng: StdRng,
}

impl FaultInjector {
    pub fn new(seed: u64) -> Self {
        FaultInjector {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Inject `fault` into `history`. Returns false when the history has
    /// no place for it, e.g. no executed invocation to leave behind.
    pub fn inject(&mut self, history: &mut History, fault: Fault) -> ArcadeResult<bool> {
        match fault {
            Fault::DuplicateEnqueue => self.duplicate_enqueue(history),
            Fault::StaleBuffer => self.stale_buffer(history),
            Fault::MissingRetirement => self.missing_retirement(history),
            Fault::DropHost => self.drop_host(history),
        }
    }

    fn duplicate_enqueue(&mut self, history: &mut History) -> ArcadeResult<bool> {
        let mut candidates = Vec::new();
        for inv in history.invocations() {
            let Some(invoked) = inv.invoked else { continue };
            let holders = history.step(invoked)?.holders(inv.id);
            let spare: Vec<ConnectorId> = history
                .architecture()
                .connectors()
                .map(|(id, _)| id)
                .filter(|id| !holders.contains(id))
                .collect();
            if !spare.is_empty() {
                candidates.push((inv.id, invoked, spare));
            }
        }
        let Some((id, invoked, spare)) = candidates.choose(&mut self.rng) else {
            return Ok(false);
        };
        let Some(connector) = spare.choose(&mut self.rng) else {
            return Ok(false);
        };
        history.record_buffered(*connector, *id, *invoked)?;
        Ok(true)
    }

    fn stale_buffer(&mut self, history: &mut History) -> ArcadeResult<bool> {
        let mut candidates: Vec<(InvocationId, ConnectorId, Step)> = Vec::new();
        for inv in history.invocations() {
            let Some(invoked) = inv.invoked else { continue };
            let Some(before) = invoked.pred() else { continue };
            if let Some(holder) = history.step(invoked)?.holders(inv.id).first() {
                candidates.push((inv.id, *holder, before));
            }
        }
        let Some((id, connector, before)) = candidates.choose(&mut self.rng).copied() else {
            return Ok(false);
        };
        history.record_buffered(connector, id, before)?;
        Ok(true)
    }

    fn missing_retirement(&mut self, history: &mut History) -> ArcadeResult<bool> {
        let timeline = history.timeline();
        let mut candidates: Vec<(InvocationId, ConnectorId, Step)> = Vec::new();
        for inv in history.invocations() {
            let (Some(_), Some(executed)) = (inv.invoked, inv.executed) else {
                continue;
            };
            let Some(after) = timeline.next(executed) else { continue };
            if let [holder] = history.step(executed)?.holders(inv.id).as_slice() {
                candidates.push((inv.id, *holder, after));
            }
        }
        let Some((id, connector, after)) = candidates.choose(&mut self.rng).copied() else {
            return Ok(false);
        };
        history.record_buffered(connector, id, after)?;
        Ok(true)
    }

    fn drop_host(&mut self, history: &mut History) -> ArcadeResult<bool> {
        let components: Vec<ComponentId> = history.architecture().components().collect();
        let Some(component) = components.choose(&mut self.rng).copied() else {
            return Ok(false);
        };
        let step = Step(self.rng.gen_range(0..history.timeline().len()));
        history.step_mut(step)?.topology.evict(component);
        Ok(true)
    }
}
