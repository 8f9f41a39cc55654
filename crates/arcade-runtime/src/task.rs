//! Online monitor on a tokio task
//!
//! Step facts go in over an `mpsc` channel, violations come out over
//! another. The task ends when the input closes or cancellation fires,
//! then runs the history-scoped checks and yields a [`MonitorSummary`].
//! Each step is observed synchronously, so cancellation lands between
//! steps and never inside one.

use std::sync::Arc;

use arcade_core::{ArcadeError, ArcadeResult, Violation};
use arcade_engine::{MonitorStats, MonitorSummary, OnlineMonitor};
use arcade_model::{Architecture, Invocation, StepFacts};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::RuntimeConfig;

/// Drive `monitor` until `steps` closes or `cancel` turns true
pub fn spawn_monitor(
    mut monitor: OnlineMonitor,
    mut steps: mpsc::Receiver<StepFacts>,
    violations: mpsc::Sender<Violation>,
    mut cancel: watch::Receiver<bool>,
) -> JoinHandle<MonitorSummary> {
    tokio::spawn(async move {
        let mut cancel_open = true;
        let mut publishing = true;
        loop {
            tokio::select! {
                biased;
                changed = cancel.changed(), if cancel_open => {
                    match changed {
                        Ok(()) if *cancel.borrow() => {
                            info!(next_step = %monitor.next_step(), "monitor cancelled");
                            break;
                        }
                        Ok(()) => {}
                        // no one can cancel any more
                        Err(_) => cancel_open = false,
                    }
                }
                next = steps.recv() => {
                    let Some(facts) = next else {
                        debug!("step channel closed");
                        break;
                    };
                    for violation in monitor.observe(facts) {
                        if publishing && violations.send(violation).await.is_err() {
                            debug!("violation receiver dropped, monitoring continues");
                            publishing = false;
                        }
                    }
                }
            }
        }
        monitor.finish()
    })
}

/// A running monitor with its channels
pub struct MonitorHandle {
    steps: mpsc::Sender<StepFacts>,
    violations: mpsc::Receiver<Violation>,
    cancel: watch::Sender<bool>,
    stats: Arc<RwLock<MonitorStats>>,
    task: JoinHandle<MonitorSummary>,
}

impl MonitorHandle {
    /// Feed the next step
    pub async fn send(&self, facts: StepFacts) -> ArcadeResult<()> {
        self.steps
            .send(facts)
            .await
            .map_err(|_| ArcadeError::MonitorClosed)
    }

    /// Next published violation, `None` once the task has ended
    pub async fn next_violation(&mut self) -> Option<Violation> {
        self.violations.recv().await
    }

    /// Stop after the step being observed, if any
    pub fn cancel(&self) {
        // the task may already have ended
        let _ = self.cancel.send(true);
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats.read().clone()
    }

    /// Close the input, wait for the task, and collect the violations not
    /// yet read
    pub async fn finish(self) -> ArcadeResult<(MonitorSummary, Vec<Violation>)> {
        let MonitorHandle {
            steps,
            mut violations,
            cancel,
            task,
            ..
        } = self;
        drop(steps);

        let mut pending = Vec::new();
        while let Some(violation) = violations.recv().await {
            pending.push(violation);
        }
        let summary = task.await.map_err(|_| ArcadeError::MonitorClosed)?;
        drop(cancel);
        Ok((summary, pending))
    }
}

/// Spawn a monitor for `architecture` with channels sized by `config`
pub fn start_monitor(
    config: &RuntimeConfig,
    architecture: Architecture,
    invocations: impl IntoIterator<Item = Invocation>,
) -> MonitorHandle {
    let mut monitor = OnlineMonitor::new(architecture, config.validator.clone());
    for invocation in invocations {
        monitor.register(invocation);
    }
    let stats = monitor.stats_handle();

    let capacity = config.channel_capacity.max(1);
    let (steps_tx, steps_rx) = mpsc::channel(capacity);
    let (violations_tx, violations_rx) = mpsc::channel(capacity);
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let task = spawn_monitor(monitor, steps_rx, violations_tx, cancel_rx);

    MonitorHandle {
        steps: steps_tx,
        violations: violations_rx,
        cancel: cancel_tx,
        stats,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::{ComponentId, NodeId, PortId, Rule, Step};
    use arcade_engine::ValidatorConfig;
    use arcade_model::{History, PortSpec};

    fn history() -> History {
        let mut arch = Architecture::new();
        arch.add_node(NodeId(1));
        arch.add_component(ComponentId(1));
        arch.add_port(PortId(1), PortSpec::new());
        let mut history = History::new(arch, 3).unwrap();
        history.place(ComponentId(1), NodeId(1)).unwrap();
        history.attach(PortId(1), ComponentId(1)).unwrap();
        history
    }

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            validator: ValidatorConfig::relaxed(),
            ..RuntimeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_clean_stream() {
        let history = history();
        let handle = start_monitor(&config(), history.architecture().clone(), []);
        for (_, facts) in history.steps() {
            handle.send(facts.clone()).await.unwrap();
        }
        let (summary, pending) = handle.finish().await.unwrap();
        assert!(pending.is_empty());
        assert!(summary.passed());
        assert_eq!(summary.stats.steps, 3);
    }

    #[tokio::test]
    async fn test_violations_published_without_halting() {
        let mut history = history();
        history.detach_from(PortId(1), ComponentId(1), Step(1)).unwrap();

        let mut handle = start_monitor(&config(), history.architecture().clone(), []);
        for (_, facts) in history.steps() {
            handle.send(facts.clone()).await.unwrap();
        }
        let first = handle.next_violation().await.unwrap();
        assert_eq!(first.rule, Rule::PortOwnership);
        assert_eq!(first.step, Some(Step(1)));

        let (summary, pending) = handle.finish().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(summary.stats.steps, 3);
        assert_eq!(summary.stats.structural, 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_between_steps() {
        let history = history();
        let handle = start_monitor(&config(), history.architecture().clone(), []);
        handle.send(history.facts(Step(0)).unwrap().clone()).await.unwrap();
        handle.cancel();

        let (summary, _) = handle.finish().await.unwrap();
        assert!(summary.stats.steps <= 1);
        assert!(summary.passed());
    }

    #[tokio::test]
    async fn test_raw_channels() {
        let history = history();
        let monitor = OnlineMonitor::new(history.architecture().clone(), ValidatorConfig::relaxed());
        let (steps_tx, steps_rx) = mpsc::channel(4);
        let (violations_tx, violations_rx) = mpsc::channel(4);
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        // nobody listens for violations; the monitor keeps going
        drop(violations_rx);

        let task = spawn_monitor(monitor, steps_rx, violations_tx, cancel_rx);
        steps_tx.send(arcade_model::StepFacts::new()).await.unwrap();
        drop(steps_tx);
        let summary = task.await.unwrap();
        assert_eq!(summary.stats.steps, 1);
        assert_eq!(summary.stats.structural, 2);
    }
}
