//! Tracing setup for the campaign dashboard.
//!
//! `RUST_LOG` wins when set; otherwise the filter comes from the
//! `APP_LOG_LEVEL` value carried in [`TelemetryConfig`].

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidLogLevel { value: String, source: ParseError },
    Install(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidLogLevel { value, .. } => {
                write!(f, "APP_LOG_LEVEL '{value}' is not a valid tracing filter")
            }
            TelemetryError::Install(err) => {
                write!(f, "failed to install tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidLogLevel { source, .. } => Some(source),
            TelemetryError::Install(err) => Some(&**err),
        }
    }
}

/// Build the filter from the configured level, without consulting `RUST_LOG`.
fn filter_from_config(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::InvalidLogLevel {
        value: config.log_level.clone(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_from_config(config)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_builds_a_filter() {
        let config = TelemetryConfig {
            log_level: "vishguard=debug,info".to_string(),
        };
        assert!(filter_from_config(&config).is_ok());
    }

    #[test]
    fn malformed_level_names_the_config_variable() {
        let config = TelemetryConfig {
            log_level: "not a [filter".to_string(),
        };

        let error = filter_from_config(&config).expect_err("malformed filter rejected");
        assert!(matches!(error, TelemetryError::InvalidLogLevel { .. }));
        assert!(error.to_string().contains("APP_LOG_LEVEL"));
        assert!(error.to_string().contains("not a [filter"));
    }
}
