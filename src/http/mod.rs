//! HTTP protocol layer module
//!
//! Response builders and query-string helpers, kept apart from the routing
//! and query logic.

pub mod params;
pub mod response;

pub use params::query_param;
pub use response::{
    build_404_response, build_405_response, build_500_response, build_geojson_response,
    build_health_response, build_options_response, build_ready_response, GEOJSON_CONTENT_TYPE,
};
