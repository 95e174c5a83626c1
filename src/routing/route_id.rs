//! Route id derivation.
//!
//! A route id classifies a request into one of the named template fragments:
//!
//! - prefix `htmx` when the `HX-Request` header is exactly `true`, else `http`
//! - the HTTP method
//! - the sorted set of non-underscore query parameter names
//!
//! joined with `-` and lowercased. Examples:
//!
//! - plain `GET /` → `http-get`
//! - `GET /` with `HX-Request: true` → `htmx-get`
//! - `POST /?nav` → `http-post-nav`
//! - `DELETE /?id=5&_cache=123` with `HX-Request: true` → `htmx-delete-id`

use std::collections::BTreeSet;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request};

/// Header that marks a request as a partial (htmx) update.
pub const MARKER_HEADER: &str = "hx-request";

/// Route id prefix for partial requests.
pub const PARTIAL_PREFIX: &str = "htmx";

/// Route id prefix for full-page requests.
pub const FULL_PREFIX: &str = "http";

/// Derive the route id for a request.
///
/// Pure and infallible; calling it twice on the same request yields the
/// same string both times.
pub fn derive(request: &Request<Body>) -> String {
    derive_parts(
        request.method(),
        request.headers(),
        request.uri().query().unwrap_or(""),
    )
}

/// Derive a route id from the request parts that matter to dispatch.
pub fn derive_parts(method: &Method, headers: &HeaderMap, query: &str) -> String {
    let prefix = if headers
        .get(MARKER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "true")
        .unwrap_or(false)
    {
        PARTIAL_PREFIX
    } else {
        FULL_PREFIX
    };

    // BTreeSet gives dedup and ascending order in one step. Names are
    // lowercased before insertion so `ID` and `id` collapse to one entry.
    let names: BTreeSet<String> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(name, _)| name.to_lowercase())
        .filter(|name| !name.is_empty() && !name.starts_with('_'))
        .collect();

    let mut parts = Vec::with_capacity(2 + names.len());
    parts.push(prefix.to_string());
    parts.push(method.as_str().to_string());
    parts.extend(names);

    parts.join("-").to_lowercase()
}
