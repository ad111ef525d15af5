//! Request logging with credential masking and request ids

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use super::metrics::route_label;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headers worth logging, and whether their value must be masked
const LOGGED_HEADERS: &[(&str, bool)] = &[
    ("content-type", false),
    ("content-length", false),
    ("accept", false),
    ("user-agent", false),
    ("x-forwarded-for", false),
    ("x-real-ip", false),
    ("authorization", true),
    ("proxy-authorization", true),
    ("cookie", true),
];

/// Log each request and its outcome, echoing the request id back.
/// `TraceLayer` owns the request span, so none is opened here.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let route = route_label(&request);
    let request_id = resolve_request_id(request.headers());

    info!(
        %method,
        %route,
        uri = %request.uri(),
        %request_id,
        headers = %loggable_headers(request.headers()),
        "Incoming request"
    );

    let mut response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis();

    if response.status().is_server_error() {
        warn!(%method, %route, status, %elapsed_ms, %request_id, "Request failed");
    } else {
        info!(%method, %route, status, %elapsed_ms, %request_id, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

/// Client-supplied id, or a fresh UUID
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string)
}

fn loggable_headers(headers: &HeaderMap) -> String {
    LOGGED_HEADERS
        .iter()
        .filter_map(|&(name, masked)| {
            let value = headers.get(name)?;
            let shown = if masked {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            Some(format!("{}={}", name, shown))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_credentials_are_masked() {
        let logged = loggable_headers(&headers(&[
            ("authorization", "Bearer abc"),
            ("content-type", "application/json"),
            ("etag", "\"x\""),
        ]));

        assert_eq!(logged, "content-type=application/json, authorization=[REDACTED]");
    }

    #[test]
    fn test_request_id_is_reused() {
        assert_eq!(resolve_request_id(&headers(&[(REQUEST_ID_HEADER, "req-42")])), "req-42");
    }

    #[test]
    fn test_request_id_is_generated_when_missing_or_blank() {
        for map in [headers(&[]), headers(&[(REQUEST_ID_HEADER, "  ")])] {
            assert!(uuid::Uuid::parse_str(&resolve_request_id(&map)).is_ok());
        }
    }
}
