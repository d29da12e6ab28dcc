//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token issuing configuration.
    pub auth: AuthConfig,
    /// Image triage configuration.
    #[serde(default)]
    pub triage: TriageConfig,
    /// First-run admin account.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// Image triage (object detection) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    /// Detection endpoint. When unset, triage is text-only.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Upper bound for a single classification call.
    #[serde(default = "default_triage_timeout_ms")]
    pub timeout_ms: u64,
    /// Labels scoring below this are ignored.
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    /// Detected labels that escalate a complaint to high urgency.
    #[serde(default = "default_hazard_labels")]
    pub hazard_labels: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_triage_timeout_ms(),
            min_score: default_min_score(),
            hazard_labels: default_hazard_labels(),
        }
    }
}

impl TriageConfig {
    /// Configured detection endpoint, ignoring a blank value.
    #[must_use]
    pub fn image_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Admin account created at start-up when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Display name of the admin.
    #[serde(default)]
    pub admin_name: Option<String>,
    /// Login email of the admin.
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Initial password of the admin.
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_token_ttl_hours() -> i64 {
    24 * 7
}

const fn default_triage_timeout_ms() -> u64 {
    5_000
}

const fn default_min_score() -> f32 {
    0.5
}

fn default_hazard_labels() -> Vec<String> {
    vec!["fire".to_string(), "smoke".to_string()]
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, only to populate the environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `HOSTEL_ENV`)
    /// 4. Environment variables with `HOSTEL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let env = std::env::var("HOSTEL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HOSTEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("HOSTEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
