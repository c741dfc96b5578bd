use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_REFERENCE_PREFIX: &str = "APP";
const DEFAULT_REFERENCE_ATTEMPTS: u8 = 5;
const MAX_REFERENCE_ATTEMPTS: u8 = 20;

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

/// Top-level configuration for the intake service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
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

        let reference_prefix = env::var("INTAKE_REFERENCE_PREFIX")
            .unwrap_or_else(|_| DEFAULT_REFERENCE_PREFIX.to_string());
        let reference_prefix = reference_prefix.trim().to_ascii_uppercase();
        if reference_prefix.is_empty()
            || !reference_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::InvalidReferencePrefix {
                value: reference_prefix,
            });
        }

        let reference_attempts = match env::var("INTAKE_REFERENCE_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|value| (1..=MAX_REFERENCE_ATTEMPTS).contains(value))
                .ok_or(ConfigError::InvalidReferenceAttempts)?,
            Err(_) => DEFAULT_REFERENCE_ATTEMPTS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            intake: IntakeConfig {
                reference_prefix,
                reference_attempts,
            },
        })
    }
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
    pub ansi: bool,
}

/// Reference-number allocation settings for the application store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    pub reference_prefix: String,
    /// How many fresh reference numbers to try before giving up on a collision.
    pub reference_attempts: u8,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            reference_attempts: DEFAULT_REFERENCE_ATTEMPTS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidReferencePrefix { value: String },
    InvalidReferenceAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidReferencePrefix { value } => write!(
                f,
                "INTAKE_REFERENCE_PREFIX must be non-empty and alphanumeric (found '{}')",
                value
            ),
            ConfigError::InvalidReferenceAttempts => write!(
                f,
                "INTAKE_REFERENCE_ATTEMPTS must be between 1 and {}",
                MAX_REFERENCE_ATTEMPTS
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidReferencePrefix { .. }
            | ConfigError::InvalidReferenceAttempts => None,
        }
    }
}
