// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, DatasetConfig, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    RoutesConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `HOUSING__DATASET__PATH`
const ENV_PREFIX: &str = "HOUSING";

impl Config {
    /// Load configuration from the given file path (extension optional).
    ///
    /// The file is optional; values fall back to environment variables and
    /// then to built-in defaults.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("dataset.path", "data/housing.geojson")?
            .set_default("dataset.filter_key", "muni")?
            .set_default("dataset.strict", false)?
            .set_default("dataset.assign_ids", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 128)?
            .set_default("http.server_name", "housing-api")?
            .set_default("http.enable_cors", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

#[cfg(test)]
impl Config {
    /// Defaults used by unit tests, independent of files and environment
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            dataset: DatasetConfig::default(),
            logging: LoggingConfig {
                level: "error".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
                backlog: 128,
            },
            http: HttpConfig {
                server_name: "housing-api".to_string(),
                enable_cors: false,
            },
            routes: RoutesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    // Environment variables are process-wide; loads must not interleave
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[test]
    fn test_defaults_without_file() {
        let _guard = env_lock();
        let cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.dataset.filter_key, "muni");
        assert!(cfg.dataset.assign_ids);
        assert!(!cfg.dataset.strict);
        assert_eq!(cfg.routes.housing_path, "/api/housing");
        assert_eq!(cfg.routes.health.liveness_path, "/healthz");
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let _guard = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8081\n\n[dataset]\npath = \"/srv/housing.geojson\"\nstrict = true\n\n[http]\nenable_cors = true"
        )
        .unwrap();

        let cfg = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.dataset.path, "/srv/housing.geojson");
        assert!(cfg.dataset.strict);
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.http.server_name, "housing-api");
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let _guard = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 8081").unwrap();

        let vars = [
            ("HOUSING__SERVER__PORT", "9123"),
            ("HOUSING__DATASET__FILTER_KEY", "town"),
            ("HOUSING__PERFORMANCE__MAX_CONNECTIONS", "5"),
            // single underscore after the prefix is not part of the layer
            ("HOUSING_SERVER__HOST", "0.0.0.0"),
            ("HOUSING_CONFIG", "elsewhere"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let loaded = Config::load_from(file.path().to_str().unwrap());

        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let cfg = loaded.unwrap();
        assert_eq!(cfg.server.port, 9123);
        assert_eq!(cfg.dataset.filter_key, "town");
        assert_eq!(cfg.performance.max_connections, Some(5));
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::for_tests();
        let addr = cfg.get_socket_addr().unwrap();
        assert!(addr.is_ipv4());

        let mut bad = Config::for_tests();
        bad.server.host = "not a host".to_string();
        assert!(bad.get_socket_addr().is_err());
    }
}
