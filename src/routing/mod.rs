//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, headers, query string)
//!     → route_id.rs (derive deterministic route id)
//!     → FragmentSet lookup by that id
//!     → Return: matched fragment or NotFound
//! ```
//!
//! # Design Decisions
//! - Route id is a pure function of the request; no I/O, no failure path
//! - Duplicate query names collapse, casing is normalized, order is irrelevant
//! - Names starting with `_` are reserved for cache-busting and never route

pub mod route_id;

pub use route_id::derive;
