//! Invocation router - the only programmatic writer of connector buffers
//!
//! The router drives an invocation through its lifecycle by writing buffer
//! facts into a [`History`]:
//!
//! - `issue` enqueues it in the caller's connector at its invoked step
//! - `forward` hands it to another connector, hop by hop
//! - `execute` carries it up to the execute step and retires it there
//! - `hold` keeps a pending one where it is
//!
//! Every call validates first and mutates after, so a refused call leaves
//! the history untouched.

use arcade_core::{ArcadeError, ArcadeResult, ConnectorId, InvocationId, Step};
use arcade_model::{History, Invocation};
use tracing::debug;

use crate::lifecycle;

/// Writes buffer facts for invocations of one history
pub struct Router<'h> {
    history: &'h mut History,
}

impl<'h> Router<'h> {
    pub fn new(history: &'h mut History) -> Self {
        Router { history }
    }

    pub fn history(&self) -> &History {
        &*self.history
    }

    /// Connector holding the invocation at the latest step it is buffered,
    /// with that step
    pub fn holder(&self, id: InvocationId) -> Option<(ConnectorId, Step)> {
        self.history
            .steps()
            .filter_map(|(step, facts)| facts.holders(id).first().map(|c| (*c, step)))
            .last()
    }

    /// Enqueue an invoked invocation in the single connector taking calls in
    /// at its caller port, at its invoked step. The caller port must be in
    /// use at that step.
    pub fn issue(&mut self, id: InvocationId) -> ArcadeResult<ConnectorId> {
        let inv = self.history.require_invocation(id)?;
        let invoked = pending(inv)?;
        if self.holder(id).is_some() {
            return Err(ArcadeError::AlreadyIssued(id));
        }
        let caller = inv.caller.ok_or(ArcadeError::NoCaller(id))?;
        let facts = self.history.step(invoked)?;
        // an unused caller port is attached to nothing
        let attached = lifecycle::attached_connectors(self.history.architecture(), facts, inv);
        let connector = match attached.as_slice() {
            [] => return Err(ArcadeError::NoAttachedConnector(caller)),
            [connector] => *connector,
            many => {
                return Err(ArcadeError::AmbiguousConnector {
                    port: caller,
                    count: many.len(),
                })
            }
        };

        self.history.record_buffered(connector, id, invoked)?;
        debug!(invocation = %id, %connector, step = %invoked, "issued");
        Ok(connector)
    }

    /// Move a pending invocation into `to` at `step`. It stays in its
    /// current connector for every step in between.
    pub fn forward(&mut self, id: InvocationId, to: ConnectorId, step: Step) -> ArcadeResult<()> {
        pending(self.history.require_invocation(id)?)?;
        self.history.architecture().require_connector(to)?;
        self.history.timeline().check(step)?;
        let (from, held) = self.holder(id).ok_or(ArcadeError::NotIssued(id))?;
        if step <= held {
            return Err(ArcadeError::NonMonotonicForward {
                invocation: id,
                connector: to,
                step,
                held,
            });
        }

        self.carry(from, id, held, step.pred())?;
        self.history.record_buffered(to, id, step)?;
        debug!(invocation = %id, %from, %to, %step, "forwarded");
        Ok(())
    }

    /// Execute a pending invocation at `step` from the connector holding it.
    /// The invocation is buffered through `step` and absent afterwards.
    pub fn execute(&mut self, id: InvocationId, step: Step) -> ArcadeResult<ConnectorId> {
        let invoked = pending(self.history.require_invocation(id)?)?;
        if step < invoked {
            return Err(ArcadeError::ExecuteBeforeInvoke {
                invocation: id,
                invoked,
                executed: step,
            });
        }
        self.history.timeline().check(step)?;
        let (connector, held) = self.holder(id).ok_or(ArcadeError::NotIssued(id))?;
        if step < held {
            return Err(ArcadeError::NonMonotonicForward {
                invocation: id,
                connector,
                step,
                held,
            });
        }

        self.carry(connector, id, held, Some(step))?;
        self.history.set_executed(id, step)?;
        debug!(invocation = %id, %connector, %step, "executed");
        Ok(connector)
    }

    /// Keep a pending invocation in its current connector through `until`
    pub fn hold(&mut self, id: InvocationId, until: Step) -> ArcadeResult<ConnectorId> {
        pending(self.history.require_invocation(id)?)?;
        self.history.timeline().check(until)?;
        let (connector, held) = self.holder(id).ok_or(ArcadeError::NotIssued(id))?;
        if until < held {
            return Err(ArcadeError::NonMonotonicForward {
                invocation: id,
                connector,
                step: until,
                held,
            });
        }
        self.carry(connector, id, held, Some(until))?;
        Ok(connector)
    }

    /// Keep `id` in `connector` over `held.next ..= until`
    fn carry(
        &mut self,
        connector: ConnectorId,
        id: InvocationId,
        held: Step,
        until: Option<Step>,
    ) -> ArcadeResult<()> {
        let Some(until) = until else {
            return Ok(());
        };
        let steps: Vec<Step> = self.history.timeline().range(held.succ(), until).collect();
        for step in steps {
            self.history.record_buffered(connector, id, step)?;
        }
        Ok(())
    }
}

/// The invoked step of an issued, not yet executed invocation
fn pending(inv: &Invocation) -> ArcadeResult<Step> {
    let invoked = inv.invoked.ok_or(ArcadeError::NotIssued(inv.id))?;
    if inv.executed.is_some() {
        return Err(ArcadeError::AlreadyExecuted(inv.id));
    }
    Ok(invoked)
}
