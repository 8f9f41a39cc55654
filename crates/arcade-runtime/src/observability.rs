//! Logging setup
//!
//! Installs a global `tracing` subscriber: an `EnvFilter` built from
//! `RUST_LOG` when set, otherwise from the configured directive, and a
//! pretty or JSON fmt layer. Only the first successful call installs
//! anything.

use arcade_core::{ArcadeError, ArcadeResult};
use tracing_subscriber::EnvFilter;

use crate::{LogFormat, LoggingConfig};

/// Install the global subscriber. Returns `Ok(false)` when one is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> ArcadeResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| ArcadeError::Config(format!("log filter {:?}: {}", config.filter, e)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = match config.format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialised");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig::default();
        init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_bad_directive_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "arcade=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(ArcadeError::Config(_))));
    }
}
