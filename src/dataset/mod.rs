//! Housing dataset module
//!
//! Holds the GeoJSON feature collection loaded at startup. The collection is
//! built once and only read afterwards; every feature carries its
//! municipality key, lower-cased at load time so queries never have to look
//! the attribute up again.

mod loader;

use geojson::Feature;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the dataset. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("expected a FeatureCollection, found a {0}")]
    NotFeatureCollection(&'static str),

    #[error("feature #{index} has no string '{key}' attribute")]
    MissingKey { index: usize, key: String },
}

/// One feature of the collection together with its filter key
#[derive(Debug, Clone, PartialEq)]
pub struct HousingRecord {
    feature: Feature,
    /// Lower-cased municipality name, `None` when the attribute is absent or
    /// not a string
    muni_key: Option<String>,
}

impl HousingRecord {
    pub const fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn muni_key(&self) -> Option<&str> {
        self.muni_key.as_deref()
    }
}

/// The in-memory housing table
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<HousingRecord>,
    filter_key: String,
    unmatched: usize,
}

impl Dataset {
    /// Number of features in the collection
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Features that can never match a municipality filter
    pub const fn unmatched(&self) -> usize {
        self.unmatched
    }

    /// Attribute name the filter reads
    pub fn filter_key(&self) -> &str {
        &self.filter_key
    }

    /// All records in file order
    pub fn records(&self) -> &[HousingRecord] {
        &self.records
    }
}
