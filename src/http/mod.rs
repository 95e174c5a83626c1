//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! request
//!     → /static/* → tower-http ServeDir
//!     → anything else → dispatch handler
//!         → page lookup by path (404 on unknown page)
//!         → route id derivation
//!         → fragment lookup (404 on miss, no helper runs)
//!         → render, stream body, log path/route id/elapsed/error
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
