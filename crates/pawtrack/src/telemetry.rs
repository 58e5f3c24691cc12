//! Log subscriber setup for the adoption service.
//!
//! Workflow modules emit `tracing` events; nothing is printed until [`init`] installs the
//! subscriber built here.

use crate::config::TelemetryConfig;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("log filter '{directive}' is not a valid tracing directive")]
    InvalidLogFilter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("could not install the log subscriber: {0}")]
    SubscriberInstall(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter for the process: `RUST_LOG` when set, otherwise the configured `APP_LOG_LEVEL`.
pub fn log_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.log_level.trim()).map_err(|source| TelemetryError::InvalidLogFilter {
        directive: config.log_level.clone(),
        source,
    })
}

/// Installs the compact, uncoloured subscriber. Fails if one is already installed.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = log_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::SubscriberInstall)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn configured_level_builds_a_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = log_filter(&config(" pawtrack=debug,info ")).expect("valid directive");
        assert!(filter.to_string().contains("pawtrack=debug"));
    }

    #[test]
    fn rejects_unparseable_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        match log_filter(&config("pawtrack=verbose")) {
            Err(TelemetryError::InvalidLogFilter { directive, .. }) => {
                assert_eq!(directive, "pawtrack=verbose")
            }
            other => panic!("expected invalid filter, got {other:?}"),
        }
    }
}
