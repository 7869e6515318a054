//! HTTP response building module
//!
//! Builders for the responses the API can return. None of them panic: a
//! builder failure is logged and replaced by a bare response.

use geojson::FeatureCollection;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_LENGTH, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};

pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";
const JSON_CONTENT_TYPE: &str = "application/json";
const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Serialize a feature collection into a 200 response.
///
/// `is_head` keeps the headers (including `Content-Length`) and drops the body.
pub fn build_geojson_response(
    collection: &FeatureCollection,
    enable_cors: bool,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = match serde_json::to_vec(collection) {
        Ok(body) => body,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize feature collection: {e}"));
            return build_500_response();
        }
    };

    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(body) };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, GEOJSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length);
    if enable_cors {
        builder = builder.header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build a small JSON response
pub fn build_json_response(status: StatusCode, body: &serde_json::Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Liveness response
pub fn build_health_response() -> Response<Full<Bytes>> {
    build_json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
}

/// Readiness response, reporting the loaded feature count
pub fn build_ready_response(features: usize) -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::OK,
        &serde_json::json!({ "status": "ok", "features": features }),
    )
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({ "error": "Not Found" }),
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::from(r#"{"error":"Method Not Allowed"}"#)))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &serde_json::json!({ "error": "Internal Server Error" }),
    )
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
            .header(ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
