use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::loans::assistant::Intent;
use crate::workflows::loans::requirements::{CatalogError, RequirementCatalog};

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
    pub catalog: CatalogConfig,
    pub assistant: AssistantConfig,
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

        let catalog_path = env::var("REQUIREMENT_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let intent_priority = match env::var("ASSISTANT_INTENT_PRIORITY") {
            Ok(raw) if !raw.trim().is_empty() => parse_intent_priority(&raw)?,
            _ => Intent::DEFAULT_PRIORITY.to_vec(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig { path: catalog_path },
            assistant: AssistantConfig { intent_priority },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where requirement tables come from; `None` means the built-in catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn load(&self) -> Result<RequirementCatalog, CatalogError> {
        match &self.path {
            Some(path) => RequirementCatalog::from_path(path),
            None => Ok(RequirementCatalog::standard()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub intent_priority: Vec<Intent>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            intent_priority: Intent::DEFAULT_PRIORITY.to_vec(),
        }
    }
}

fn parse_intent_priority(raw: &str) -> Result<Vec<Intent>, ConfigError> {
    let mut priority = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let intent =
            Intent::parse(entry).ok_or_else(|| ConfigError::InvalidIntent(entry.to_string()))?;
        if priority.contains(&intent) {
            return Err(ConfigError::DuplicateIntent(entry.to_string()));
        }
        priority.push(intent);
    }
    Ok(priority)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidIntent(String),
    DuplicateIntent(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidIntent(value) => write!(
                f,
                "ASSISTANT_INTENT_PRIORITY entry '{}' must be one of email, documents, process, dscr",
                value
            ),
            ConfigError::DuplicateIntent(value) => write!(
                f,
                "ASSISTANT_INTENT_PRIORITY lists '{}' more than once",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidIntent(_)
            | ConfigError::DuplicateIntent(_) => None,
        }
    }
}
