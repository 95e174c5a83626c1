//! Template helper functions.
//!
//! # Data Flow
//! ```text
//! fragment text `{{ queryrows(sql="...", params=[...]) }}`
//!     → tera parses the call and collects named arguments
//!     → helper closure runs against the shared Db handle
//!     → returned value flows back into the render,
//!       or the error aborts the rest of that fragment
//! ```
//!
//! # Design Decisions
//! - The registry is fixed: every helper name is known here, nothing is
//!   registered dynamically at request time
//! - Helpers capture an `Arc<Db>`; the same handle survives template reloads
//! - A helper error fails the fragment render, never the server

pub mod db;
pub mod ids;

use std::sync::Arc;

use crate::db::Db;

/// The fixed set of helper functions available to fragments.
pub struct Helpers {
    db: Arc<Db>,
}

impl Helpers {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Names of every registered helper, in registration order.
    pub fn names() -> &'static [&'static str] {
        &["exec", "queryrows", "queryrow", "queryval", "uuid"]
    }

    /// Register every helper on a freshly built template set.
    pub fn register(&self, tera: &mut tera::Tera) {
        tera.register_function("exec", db::exec(self.db.clone()));
        tera.register_function("queryrows", db::queryrows(self.db.clone()));
        tera.register_function("queryrow", db::queryrow(self.db.clone()));
        tera.register_function("queryval", db::queryval(self.db.clone()));
        tera.register_function("uuid", ids::uuid());
    }
}
