//! Runtime configuration

use arcade_core::{ArcadeError, ArcadeResult};
use arcade_engine::ValidatorConfig;
use serde::{Deserialize, Serialize};

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Settings for a monitoring runtime
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Capacity of the step and violation channels
    pub channel_capacity: usize,
    pub logging: LoggingConfig,
    pub validator: ValidatorConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            channel_capacity: 64,
            logging: LoggingConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Partially-populated histories, debug logging
    pub fn development() -> Self {
        RuntimeConfig {
            channel_capacity: 16,
            logging: LoggingConfig {
                filter: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            validator: ValidatorConfig::relaxed(),
        }
    }

    /// Every rule, fatal capability findings, JSON logs
    pub fn production() -> Self {
        RuntimeConfig {
            channel_capacity: 1024,
            logging: LoggingConfig {
                filter: "info".to_string(),
                format: LogFormat::Json,
            },
            validator: ValidatorConfig::strict(),
        }
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ArcadeResult<Self> {
        serde_json::from_str(json).map_err(|e| ArcadeError::Config(format!("runtime config: {}", e)))
    }
}
