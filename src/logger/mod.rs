//! Logger module
//!
//! Provides logging utilities for the housing API including:
//! - Startup logging (configuration, dataset summary)
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
mod level;
pub mod writer;

pub use format::AccessLogEntry;
pub use level::LogLevel;

use crate::config::Config;
use crate::dataset::Dataset;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, falling back to info");
        LogLevel::Info
    });
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Level applied before `init` has run (startup errors, unit tests)
const FALLBACK_LEVEL: LogLevel = LogLevel::Info;

fn write_info(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_info(level, message),
        None if FALLBACK_LEVEL.allows(level) => println!("{message}"),
        None => {}
    }
}

fn write_error(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_error(level, message),
        None if FALLBACK_LEVEL.allows(level) => eprintln!("{message}"),
        None => {}
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(LogLevel::Info, "======================================");
    write_info(LogLevel::Info, "Housing API started");
    write_info(LogLevel::Info, &format!("Listening on: http://{addr}"));
    write_info(
        LogLevel::Info,
        &format!("Endpoint: GET http://{addr}{}", config.routes.housing_path),
    );
    write_info(LogLevel::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(LogLevel::Info, &format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(LogLevel::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(LogLevel::Info, &format!("Error log: {path}"));
    }
    write_info(LogLevel::Info, "======================================\n");
}

pub fn log_dataset_loaded(path: &str, dataset: &Dataset) {
    write_info(
        LogLevel::Info,
        &format!(
            "[Dataset] Loaded {} features from {path} (filter key '{}')",
            dataset.len(),
            dataset.filter_key()
        ),
    );
    if dataset.unmatched() > 0 {
        log_warning(&format!(
            "[Dataset] {} features have no string '{}' attribute and only appear in unfiltered results",
            dataset.unmatched(),
            dataset.filter_key()
        ));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(
        LogLevel::Debug,
        &format!("[Connection] Accepted from: {peer_addr}"),
    );
}

pub fn log_connection_idle(peer_addr: &SocketAddr, idle: std::time::Duration) {
    write_info(
        LogLevel::Debug,
        &format!(
            "[Connection] Closing {peer_addr} after {}s without a request",
            idle.as_secs()
        ),
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(
        LogLevel::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_query(criterion: &crate::query::Criterion, matched: usize) {
    write_info(
        LogLevel::Debug,
        &format!("[Query] {criterion:?} matched {matched} features"),
    );
}

pub fn log_error(message: &str) {
    write_error(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
