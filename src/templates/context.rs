//! Per-request render context.
//!
//! Fragments see the request as plain data: method, url parts, headers, and
//! the parsed query/form values. Everything is built fresh per request and
//! never shared, so fragments can read it without any coordination.

use std::collections::BTreeMap;

use axum::http::request::Parts;
use serde::Serialize;

type Values = BTreeMap<String, Vec<String>>;

/// URL pieces exposed to fragments as `url.path` / `url.query` / `url.full`.
#[derive(Debug, Clone, Serialize)]
pub struct UrlParts {
    pub path: String,
    pub query: String,
    pub full: String,
}

/// The data a fragment renders against.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentContext {
    pub method: String,
    pub url: UrlParts,
    pub headers: Values,
    /// Query-string values only.
    pub query: Values,
    /// Body values first, then query values (so `form.x.0` prefers the body).
    pub form: Values,
    /// Body values only.
    pub post_form: Values,
    /// Raw body, lossily decoded.
    pub body: String,
}

impl FragmentContext {
    /// Build the context from request parts and an already-read body.
    ///
    /// Parsing is best-effort: a body that is not form-encoded simply yields
    /// empty `post_form` data, never an error.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let query_str = parts.uri.query().unwrap_or("");
        let query = parse_values(query_str.as_bytes());

        let post_form = if is_form_encoded(parts) {
            parse_values(body)
        } else {
            Values::new()
        };

        let mut form = post_form.clone();
        for (name, values) in &query {
            form.entry(name.clone())
                .or_default()
                .extend(values.iter().cloned());
        }

        let mut headers = Values::new();
        for (name, value) in &parts.headers {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            method: parts.method.as_str().to_string(),
            url: UrlParts {
                path: parts.uri.path().to_string(),
                query: query_str.to_string(),
                full: parts.uri.to_string(),
            },
            headers,
            query,
            form,
            post_form,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Convert into the tera context handed to `render_to`.
    pub fn to_tera(&self) -> tera::Result<tera::Context> {
        tera::Context::from_serialize(self)
    }
}

fn is_form_encoded(parts: &Parts) -> bool {
    parts
        .headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

fn parse_values(input: &[u8]) -> Values {
    let mut values = Values::new();
    for (name, value) in url::form_urlencoded::parse(input) {
        if name.is_empty() {
            continue;
        }
        values
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    values
}
