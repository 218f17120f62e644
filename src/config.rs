use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_EVENT_BUFFER: usize = 64;

/// Storefront client configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the marketplace backend API
    #[validate(url)]
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Cadence of the payment-status polling loop in milliseconds
    #[validate(range(min = 1))]
    #[serde(default = "default_poll_interval_ms")]
    pub payment_poll_interval_ms: u64,

    /// Optional upper bound on how long a payment is polled before the
    /// attempt is abandoned. Unset means poll indefinitely, matching the
    /// observed storefront behavior.
    #[serde(default)]
    pub payment_poll_timeout_secs: Option<u64>,

    /// Allow duplicate cart rows for the same product (legacy behavior).
    /// Off by default: a second add of the same product is rejected.
    #[serde(default)]
    pub allow_duplicate_cart_lines: bool,

    /// Buffer size of the session event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            payment_poll_interval_ms: default_poll_interval_ms(),
            payment_poll_timeout_secs: None,
            allow_duplicate_cart_lines: false,
            event_buffer: default_event_buffer(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.payment_poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.payment_poll_timeout_secs.map(Duration::from_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Loads configuration from `config/default` and `config/{RUN_ENV}` files
/// (both optional) plus `APP__`-prefixed environment variables.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;

    Ok(app_config)
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set and non-empty.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("rephone_storefront={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}
