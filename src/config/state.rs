// Application state module
// Shared, read-only state handed to every connection task

use std::sync::Arc;

use super::types::Config;
use crate::dataset::Dataset;

/// Application state
///
/// Built once after the dataset has loaded. Nothing in here is written after
/// startup, so request handlers read it without locks.
pub struct AppState {
    pub config: Config,
    pub dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(config: Config, dataset: Dataset) -> Self {
        Self {
            config,
            dataset: Arc::new(dataset),
        }
    }

    /// Whether per-request access logging is enabled
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
