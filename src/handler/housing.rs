//! Housing query endpoint

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::query::Criterion;

/// Query parameter carrying the municipality criterion
pub const MUNICIPALITY_PARAM: &str = "municipality";

/// Answer `GET /api/housing?municipality=<name>`.
///
/// Returns the response and the number of features in it. A criterion that
/// matches nothing yields an empty collection with status 200.
pub fn serve_housing(
    query: Option<&str>,
    state: &AppState,
    is_head: bool,
) -> (Response<Full<Bytes>>, usize) {
    let raw = http::query_param(query, MUNICIPALITY_PARAM);
    let criterion = Criterion::from_param(raw.as_deref());

    let collection = state.dataset.query(&criterion);
    let matched = collection.features.len();
    logger::log_query(&criterion, matched);

    let response =
        http::build_geojson_response(&collection, state.config.http.enable_cors, is_head);
    (response, matched)
}
