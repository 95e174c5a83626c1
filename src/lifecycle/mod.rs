//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! SIGINT / SIGTERM
//!     → signals.rs (translate to one completed future)
//!     → axum graceful shutdown (stop accepting, drain in-flight requests)
//! ```
//!
//! # Design Decisions
//! - Template reloads are not a lifecycle event: the watcher swaps the site
//!   in place and the server keeps running
//! - In-flight requests finish during shutdown; nothing is dropped mid-render

pub mod signals;

pub use signals::shutdown_signal;
