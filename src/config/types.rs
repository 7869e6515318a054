// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Source dataset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Path to the GeoJSON `FeatureCollection` read at startup
    pub path: String,
    /// Attribute holding the municipality name
    #[serde(default = "default_filter_key")]
    pub filter_key: String,
    /// Abort loading when a feature lacks a string filter key
    #[serde(default)]
    pub strict: bool,
    /// Give id-less features their file position as id.
    ///
    /// Ids already present in the file are kept, so a feature may carry an
    /// id that differs from its position (a pandas-style export always
    /// writes the positional index instead).
    #[serde(default = "default_assign_ids")]
    pub assign_ids: bool,
}

fn default_filter_key() -> String {
    "muni".to_string()
}

const fn default_assign_ids() -> bool {
    true
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/housing.geojson".to_string(),
            filter_key: default_filter_key(),
            strict: false,
            assign_ids: default_assign_ids(),
        }
    }
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    #[serde(default = "default_housing_path")]
    pub housing_path: String,
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

fn default_housing_path() -> String {
    "/api/housing".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            housing_path: default_housing_path(),
            health: HealthConfig::default(),
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

const fn default_health_enabled() -> bool {
    true
}

fn default_healthz_path() -> String {
    "/healthz".to_string()
}

fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    #[serde(default = "default_backlog")]
    pub backlog: i32,
}

const fn default_backlog() -> i32 {
    128
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}
