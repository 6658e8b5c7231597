use crate::workflows::dispatch::{DEFAULT_DISPATCH_PAUSE, DEFAULT_SINK_TIMEOUT};
use crate::workflows::summarizer::{DEFAULT_SUMMARIZER_ENDPOINT, DEFAULT_SUMMARIZER_MODEL};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATASET_PATH: &str = "prioritized_feedback.csv";
const DEFAULT_SUMMARIZER_TIMEOUT_SECS: u64 = 30;

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
    pub dataset: DatasetConfig,
    pub dispatch: DispatchConfig,
    pub summarizer: SummarizerConfig,
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
        let log_format = LogFormat::from_str(&env::var("APP_LOG_FORMAT").unwrap_or_default());

        let dataset_path = optional_var("FEEDBACK_DATASET")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH));

        let sink_timeout = match numeric_var("FEEDBACK_SINK_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(ConfigError::InvalidNumber {
                    variable: "FEEDBACK_SINK_TIMEOUT_SECS",
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_SINK_TIMEOUT,
        };
        let pause = numeric_var("FEEDBACK_DISPATCH_PAUSE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DISPATCH_PAUSE);

        let summarizer_timeout = match numeric_var("SUMMARIZER_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(ConfigError::InvalidNumber {
                    variable: "SUMMARIZER_TIMEOUT_SECS",
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => Duration::from_secs(DEFAULT_SUMMARIZER_TIMEOUT_SECS),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            dataset: DatasetConfig { path: dataset_path },
            dispatch: DispatchConfig {
                sink_url: optional_var("FEEDBACK_SINK_URL"),
                timeout: sink_timeout,
                pause,
            },
            summarizer: SummarizerConfig {
                api_key: optional_var("SUMMARIZER_API_KEY"),
                model: optional_var("SUMMARIZER_MODEL")
                    .unwrap_or_else(|| DEFAULT_SUMMARIZER_MODEL.to_string()),
                endpoint: optional_var("SUMMARIZER_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SUMMARIZER_ENDPOINT.to_string()),
                timeout: summarizer_timeout,
            },
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn numeric_var(name: &'static str) -> Result<Option<u64>, ConfigError> {
    optional_var(name)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber { variable: name })
        })
        .transpose()
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

/// Outbound webhook settings. Dispatch is disabled while `sink_url` is unset.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub sink_url: Option<String>,
    pub timeout: Duration,
    pub pause: Duration,
}

#[derive(Clone)]
pub struct SummarizerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a positive whole number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
