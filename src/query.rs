//! Municipality query service
//!
//! Filters the loaded dataset by municipality. A query never touches the
//! source table: matching features are cloned into a fresh collection.

use geojson::{Feature, FeatureCollection};

use crate::dataset::{Dataset, HousingRecord};

/// Criterion value meaning "no filtering"
pub const ALL_MUNICIPALITIES: &str = "All Municipalities";

/// Parsed municipality criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Return the whole collection
    All,
    /// Lower-cased municipality name to match
    Municipality(String),
}

impl Criterion {
    /// Interpret a raw criterion. Comparison against the sentinel and against
    /// feature keys is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered == ALL_MUNICIPALITIES.to_lowercase() {
            Self::All
        } else {
            Self::Municipality(lowered)
        }
    }

    /// An absent criterion means all municipalities
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.map_or(Self::All, Self::parse)
    }

    pub fn matches(&self, record: &HousingRecord) -> bool {
        match self {
            Self::All => true,
            Self::Municipality(name) => record.muni_key() == Some(name.as_str()),
        }
    }
}

impl Dataset {
    /// Borrowing iterator over the features matching `criterion`, in order
    pub fn matches<'a>(&'a self, criterion: &'a Criterion) -> impl Iterator<Item = &'a Feature> {
        self.records()
            .iter()
            .filter(move |record| criterion.matches(record))
            .map(HousingRecord::feature)
    }

    /// Collection of matching features, possibly empty
    pub fn query(&self, criterion: &Criterion) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.matches(criterion).cloned().collect(),
            foreign_members: None,
        }
    }

    pub fn query_str(&self, raw: &str) -> FeatureCollection {
        self.query(&Criterion::parse(raw))
    }
}
