//! JSON snapshot ingestion

use std::path::Path;

use arcade_core::{ArcadeError, ArcadeResult};
use arcade_model::{History, StepFacts};
use tracing::debug;

/// Parse a history and check that its arena matches its timeline
pub fn load_history(json: &str) -> ArcadeResult<History> {
    let history: History =
        serde_json::from_str(json).map_err(|e| ArcadeError::Ingest(format!("history: {}", e)))?;
    history.check_shape()?;
    debug!(
        steps = history.timeline().len(),
        invocations = history.invocations().count(),
        "history loaded"
    );
    Ok(history)
}

/// Read and parse a history file
pub fn load_history_file(path: impl AsRef<Path>) -> ArcadeResult<History> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| ArcadeError::Ingest(format!("{}: {}", path.display(), e)))?;
    load_history(&json)
}

/// Parse the facts of a single step, as fed to a running monitor
pub fn load_step(json: &str) -> ArcadeResult<StepFacts> {
    serde_json::from_str(json).map_err(|e| ArcadeError::Ingest(format!("step: {}", e)))
}

pub fn history_to_json(history: &History) -> ArcadeResult<String> {
    serde_json::to_string_pretty(history).map_err(|e| ArcadeError::Ingest(e.to_string()))
}
