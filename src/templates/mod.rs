//! Template subsystem: fragment sets, page discovery, hot reload.
//!
//! # Data Flow
//! ```text
//! templates/*.html
//!     → source.rs (split files into named fragment blocks)
//!     → set.rs (compile one FragmentSet per page, run init fragments)
//!     → site.rs (map URL path → FragmentSet)
//!     → published as Arc<Site> behind an ArcSwap
//!
//! On file change:
//!     watcher.rs detects change, debounces
//!     → builds a brand-new Site off to the side
//!     → atomic swap on success; failure keeps the old Site serving
//! ```
//!
//! # Design Decisions
//! - FragmentSets are immutable after construction; reload swaps the whole
//!   Site, never a single fragment
//! - Init fragments (`init-<page>`) run during construction, before the set
//!   serves any request; they re-run on every reload and must be idempotent
//! - Shared files (`_*.html`) are parsed before the page file, so page files
//!   override shared fragments by name (last-writer-wins)

pub mod context;
pub mod set;
pub mod site;
pub mod source;
pub mod watcher;

use std::path::PathBuf;

/// Error type for fragment set and site construction.
///
/// Fatal only to the construction attempt that produced it; a failed reload
/// never disturbs the site already serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fragment header {header:?} in {}", path.display())]
    InvalidHeader { path: PathBuf, header: String },

    #[error("template compile error: {0}")]
    Compile(#[source] tera::Error),

    #[error("init fragment `{fragment}` failed: {source}")]
    Init {
        fragment: String,
        #[source]
        source: tera::Error,
    },
}
