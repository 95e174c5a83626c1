//! Page discovery: one FragmentSet per page template, keyed by URL path.
//!
//! Shared files (`_*.html`, sorted lexicographically) are compiled into every
//! page's set, before the page file itself. `index.html` serves `/`; any
//! other `name.html` serves `/name`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::helpers::Helpers;
use crate::templates::set::FragmentSet;
use crate::templates::BuildError;

/// Every page of the application, immutable once built.
///
/// This is the unit the reload task swaps atomically: requests capture one
/// `Arc<Site>` at the start of dispatch and keep it for their lifetime.
#[derive(Debug)]
pub struct Site {
    pages: HashMap<String, FragmentSet>,
}

impl Site {
    /// Scan `templates_dir` and build a FragmentSet for every page file.
    ///
    /// Any page failing to build fails the whole site build, leaving a
    /// previously published site (if any) untouched.
    pub fn build(templates_dir: &Path, helpers: &Helpers) -> Result<Self, BuildError> {
        let mut shared: Vec<PathBuf> = Vec::new();
        let mut page_files: Vec<PathBuf> = Vec::new();

        let entries = std::fs::read_dir(templates_dir).map_err(|source| BuildError::Io {
            path: templates_dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| BuildError::Io {
                path: templates_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".html") || !path.is_file() {
                continue;
            }
            if name.starts_with('_') {
                shared.push(path);
            } else {
                page_files.push(path);
            }
        }
        shared.sort();
        page_files.sort();

        let mut pages = HashMap::new();
        for page_file in page_files {
            let mut files = shared.clone();
            files.push(page_file.clone());
            let set = FragmentSet::build(&files, helpers)?;
            let route = page_route(&page_file);
            tracing::debug!(page = %set.page(), route = %route, "Compiled page");
            pages.insert(route, set);
        }

        Ok(Self { pages })
    }

    /// Look up the page serving a request path.
    pub fn page(&self, path: &str) -> Option<&FragmentSet> {
        self.pages.get(&normalize_path(path))
    }

    /// The URL paths this site serves, in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }
}

fn page_route(page_file: &Path) -> String {
    let stem = page_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem == "index" {
        "/".to_string()
    } else {
        format!("/{stem}")
    }
}

/// Collapse trailing slashes so `/todos/` and `/todos` hit the same page.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use crate::db::Db;

    fn helpers(dir: &Path) -> Helpers {
        Helpers::new(Arc::new(Db::open(dir.join("test.db")).unwrap()))
    }

    #[test]
    fn index_maps_to_root_and_others_to_their_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "{# fragment http-get #}\nhome").unwrap();
        fs::write(dir.path().join("about.html"), "{# fragment http-get #}\nabout").unwrap();

        let site = Site::build(dir.path(), &helpers(dir.path())).unwrap();
        assert!(site.page("/").is_some());
        assert!(site.page("/about").is_some());
        assert!(site.page("/about/").is_some());
        assert!(site.page("/missing").is_none());
        assert_eq!(site.routes().count(), 2);
    }

    #[test]
    fn shared_files_feed_every_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_layout.html"),
            "{# fragment footer #}\nshared-footer",
        )
        .unwrap();
        fs::write(dir.path().join("index.html"), "{# fragment http-get #}\nhome").unwrap();
        fs::write(dir.path().join("about.html"), "{# fragment http-get #}\nabout").unwrap();

        let site = Site::build(dir.path(), &helpers(dir.path())).unwrap();
        assert!(site.page("/").unwrap().contains("footer"));
        assert!(site.page("/about").unwrap().contains("footer"));
    }

    #[test]
    fn non_html_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "{# fragment http-get #}\nhome").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a template").unwrap();

        let site = Site::build(dir.path(), &helpers(dir.path())).unwrap();
        assert_eq!(site.routes().count(), 1);
    }

    #[test]
    fn one_broken_page_fails_the_whole_build() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "{# fragment http-get #}\nok").unwrap();
        fs::write(dir.path().join("bad.html"), "{# fragment a #}\n{% end %}").unwrap();

        assert!(Site::build(dir.path(), &helpers(dir.path())).is_err());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Site::build(&dir.path().join("nope"), &helpers(dir.path())).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
