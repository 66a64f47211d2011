use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveTime;

use crate::exclusions::safe_hours::SafeHoursConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub safe_hours: SafeHoursConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            safe_hours: load_safe_hours()?,
        })
    }
}

/// Initial safe-hours policy from the environment; every variable falls back
/// to the built-in default so a bare deployment starts with a sane window.
fn load_safe_hours() -> Result<SafeHoursConfig, ConfigError> {
    let mut config = SafeHoursConfig::default();

    if let Ok(raw) = env::var("APP_SAFE_HOURS_ENABLED") {
        config.enabled = parse_bool("APP_SAFE_HOURS_ENABLED", &raw)?;
    }
    if let Ok(raw) = env::var("APP_SAFE_HOURS_TIMEZONE") {
        config.default_timezone = raw.trim().to_string();
    }
    if let Ok(raw) = env::var("APP_SAFE_HOURS_START") {
        config.start_time = parse_time("APP_SAFE_HOURS_START", &raw)?;
    }
    if let Ok(raw) = env::var("APP_SAFE_HOURS_END") {
        config.end_time = parse_time("APP_SAFE_HOURS_END", &raw)?;
    }
    if let Ok(raw) = env::var("APP_SAFE_HOURS_EXCLUDE_WEEKENDS") {
        config.exclude_weekends = parse_bool("APP_SAFE_HOURS_EXCLUDE_WEEKENDS", &raw)?;
    }

    Ok(config)
}

fn parse_bool(variable: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { variable }),
    }
}

fn parse_time(variable: &'static str, raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|source| ConfigError::InvalidTime { variable, source })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBool { variable: &'static str },
    InvalidTime { variable: &'static str, source: chrono::ParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBool { variable } => {
                write!(f, "{variable} must be a boolean (true/false)")
            }
            ConfigError::InvalidTime { variable, .. } => {
                write!(f, "{variable} must be a HH:MM wall-clock time")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidBool { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidTime { source, .. } => Some(source),
        }
    }
}
