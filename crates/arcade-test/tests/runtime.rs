//! Ingestion and the monitor task, end to end

use arcade_core::Rule;
use arcade_engine::{Validator, ValidatorConfig};
use arcade_runtime::{history_to_json, load_history, start_monitor, RuntimeConfig};
use arcade_test::{round_trip_history, Fault, FaultInjector, GeneratorConfig, HistoryGenerator};

#[tokio::test]
async fn test_ingested_round_trip_monitored_clean() {
    let json = history_to_json(&round_trip_history().unwrap()).unwrap();
    let history = load_history(&json).unwrap();
    assert_eq!(history, round_trip_history().unwrap());

    let config = RuntimeConfig::default();
    let handle = start_monitor(
        &config,
        history.architecture().clone(),
        history.invocations().cloned(),
    );
    for (_, facts) in history.steps() {
        handle.send(facts.clone()).await.unwrap();
    }

    let (summary, pending) = handle.finish().await.unwrap();
    assert!(pending.is_empty());
    assert!(summary.passed());
    assert_eq!(summary.stats.steps, history.timeline().len());
    assert_eq!(summary.stats.total(), 0);
}

#[tokio::test]
async fn test_monitor_streams_what_batch_reports() {
    let mut history = HistoryGenerator::new(GeneratorConfig::default()).generate().unwrap();
    let mut injector = FaultInjector::new(3);
    assert!(injector.inject(&mut history, Fault::DuplicateEnqueue).unwrap());
    let batch = Validator::new(ValidatorConfig::default()).validate(&history);

    let config = RuntimeConfig::default();
    let mut handle = start_monitor(
        &config,
        history.architecture().clone(),
        history.invocations().cloned(),
    );
    for (_, facts) in history.steps() {
        handle.send(facts.clone()).await.unwrap();
    }
    let first = handle.next_violation().await.unwrap();
    assert_eq!(first.rule, Rule::SetupBuffering);

    let (summary, pending) = handle.finish().await.unwrap();
    assert!(!summary.passed());
    assert_eq!(1 + pending.len() + summary.report.len(), batch.len());
}
