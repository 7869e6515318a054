//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, dispatch and access logging.

use crate::config::AppState;
use crate::handler::housing;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Response plus the feature count when the request was a housing query
struct Routed {
    response: Response<Full<Bytes>>,
    features: Option<usize>,
}

impl From<Response<Full<Bytes>>> for Routed {
    fn from(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            features: None,
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let Routed {
        mut response,
        features,
    } = route_request(&req, &state);

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if state.access_log() {
        let entry = access_entry(&req, &response, peer_addr, features, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on method and path
fn route_request<B>(req: &Request<B>, state: &AppState) -> Routed {
    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    // 1. Method check
    match *method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => {
            return http::build_options_response(state.config.http.enable_cors).into();
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response().into();
        }
    }

    let routes = &state.config.routes;

    // 2. Health check endpoints
    if routes.health.enabled {
        if path == routes.health.liveness_path {
            return http::build_health_response().into();
        }
        if path == routes.health.readiness_path {
            return http::build_ready_response(state.dataset.len()).into();
        }
    }

    // 3. Housing query
    if path == routes.housing_path {
        let (response, matched) = housing::serve_housing(req.uri().query(), state, is_head);
        return Routed {
            response,
            features: Some(matched),
        };
    }

    http::build_404_response().into()
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    features: Option<usize>,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default();
    entry.features = features;
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
