//! HTTP server setup and the fragment dispatch handler.
//!
//! # Responsibilities
//! - Create the Axum router: static files plus the catch-all dispatcher
//! - Per request: derive the route id, look up the fragment, render it
//! - Log every handled request with path, route id, elapsed time and error
//!
//! # Design Decisions
//! - The dispatcher captures one Arc<Site> per request; a concurrent reload
//!   never changes what an in-flight request renders against
//! - A render error before any output became available is a 500; an error
//!   after partial output ships the partial body (it cannot be unsent)
//! - Body/form parse problems degrade to empty form data, never to a failure

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::lifecycle::signals::shutdown_signal;
use crate::routing;
use crate::templates::context::FragmentContext;
use crate::templates::site::Site;

/// Bodies larger than this are ignored for form parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<ArcSwap<Site>>,
}

/// HTTP server for the to-do application.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and state.
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        let router = Router::new()
            .nest_service("/static", ServeDir::new(&config.paths.static_dir))
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http());
        Self { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the server in tests without a listener.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Fragment dispatch handler: every non-static request lands here.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();

    // One load per request; this reference stays valid across reloads.
    let site = state.site.load_full();

    let path = request.uri().path().to_string();
    let route_id = routing::derive(&request);

    let Some(page) = site.page(&path) else {
        tracing::info!(
            path = %path,
            route_id = %route_id,
            elapsed = ?start.elapsed(),
            "No page for path"
        );
        return (StatusCode::NOT_FOUND, "404 page not found\n").into_response();
    };

    if !page.contains(&route_id) {
        tracing::info!(
            path = %path,
            route_id = %route_id,
            elapsed = ?start.elapsed(),
            "No fragment for route id"
        );
        return (StatusCode::NOT_FOUND, "404 page not found\n").into_response();
    }

    let (parts, body) = request.into_parts();
    // best-effort: an unreadable or oversized body means "no form data"
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .unwrap_or_default();

    let context = FragmentContext::from_parts(&parts, &body_bytes);
    let tera_context = match context.to_tera() {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(
                path = %path,
                route_id = %route_id,
                elapsed = ?start.elapsed(),
                error = %e,
                "Failed to build render context"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n")
                .into_response();
        }
    };

    // Rendering is synchronous (tera plus blocking sqlite helpers), so it
    // runs off the executor thread, like the reload path's rebuilds.
    let rendered = {
        let site = site.clone();
        let path = path.clone();
        let route_id = route_id.clone();
        tokio::task::spawn_blocking(move || {
            let mut output = Vec::new();
            let result = match site.page(&path) {
                Some(page) => page.render_to(&route_id, &tera_context, &mut output),
                // the lookup above used this same site snapshot, and a
                // snapshot never mutates
                None => Err(tera::Error::msg("page disappeared mid-dispatch")),
            };
            (result, output)
        })
        .await
    };

    let (result, output) = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!(
                path = %path,
                route_id = %route_id,
                elapsed = ?start.elapsed(),
                error = %e,
                "Render task panicked"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n")
                .into_response();
        }
    };

    match result {
        Ok(()) => {
            tracing::info!(
                path = %path,
                route_id = %route_id,
                elapsed = ?start.elapsed(),
                bytes = output.len(),
                "Handled request"
            );
            html_response(StatusCode::OK, output)
        }
        Err(e) if output.is_empty() => {
            tracing::error!(
                path = %path,
                route_id = %route_id,
                elapsed = ?start.elapsed(),
                error = %render_error(&e),
                "Fragment render failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n").into_response()
        }
        Err(e) => {
            // partial output already exists; ship it and log, no rollback
            tracing::error!(
                path = %path,
                route_id = %route_id,
                elapsed = ?start.elapsed(),
                error = %render_error(&e),
                bytes = output.len(),
                "Fragment render failed after partial output"
            );
            html_response(StatusCode::OK, output)
        }
    }
}

fn html_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Flatten a tera error chain into one line; the top-level message alone
/// ("Failed to render ...") hides the interesting cause.
fn render_error(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
