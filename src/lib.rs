//! Read-only HTTP API serving housing features as GeoJSON, optionally
//! filtered by municipality.
//!
//! The dataset is loaded once at startup ([`dataset::Dataset::load`]) and
//! shared read-only across connections; each request runs a
//! [`query::Criterion`] over it.

pub mod config;
pub mod dataset;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod query;
pub mod server;

pub use error::{Error, Result};
