use std::env;
use std::fmt;
use std::time::Duration;

/// Base URL of the prediction service when nothing overrides it.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_millis(3000);

/// Distinguishes runtime behavior for different stages of the client.
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
    pub service: ServiceConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = match env::var("ATTRITION_API_BASE") {
            Ok(raw) => normalize_base_url(&raw)?,
            Err(_) => DEFAULT_API_BASE.to_string(),
        };

        let health_interval = read_duration(
            "ATTRITION_HEALTH_INTERVAL_SECS",
            DEFAULT_HEALTH_INTERVAL,
            Duration::from_secs,
        )?;
        let health_timeout = read_duration(
            "ATTRITION_HEALTH_TIMEOUT_MS",
            DEFAULT_HEALTH_TIMEOUT,
            Duration::from_millis,
        )?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            service: ServiceConfig {
                base_url,
                health_interval,
                health_timeout,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn read_duration(
    key: &'static str,
    default: Duration,
    unit: fn(u64) -> Duration,
) -> Result<Duration, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(unit(value)),
        _ => Err(ConfigError::InvalidDuration { key, value: raw }),
    }
}

/// Where the prediction service lives and how its health is probed.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub health_interval: Duration,
    pub health_timeout: Duration,
}

impl ServiceConfig {
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            health_interval: DEFAULT_HEALTH_INTERVAL,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());
    if has_scheme && has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_string()))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl(String),
    InvalidDuration { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl(value) => write!(
                f,
                "service base URL '{value}' must be an http:// or https:// URL"
            ),
            ConfigError::InvalidDuration { key, value } => {
                write!(f, "{key} must be a positive integer (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
