//! Compiled fragment sets.
//!
//! # Responsibilities
//! - Merge fragment definitions across source files (last-writer-wins)
//! - Compile every fragment into one tera instance with the helpers bound
//! - Eagerly run `init-<stem>` fragments before the set goes live
//!
//! # Design Decisions
//! - Immutable after construction; safe to share across requests without
//!   coordination
//! - A compile or init failure fails the whole build, so a set is either
//!   fully usable or never installed
//! - Init fragments re-run on every rebuild; they are required to be
//!   idempotent (e.g. `CREATE TABLE IF NOT EXISTS`)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::helpers::Helpers;
use crate::templates::source::parse_fragments;
use crate::templates::BuildError;

/// The compiled, named fragment collection for one page.
#[derive(Debug)]
pub struct FragmentSet {
    page: String,
    tera: Tera,
    names: HashSet<String>,
}

impl FragmentSet {
    /// Compile `files` (shared files first, the page file last) into a set.
    ///
    /// Later files replace earlier fragments of the same name, which is what
    /// lets a page file override a shared layout fragment. After compilation
    /// every `init-<file stem>` fragment is rendered once, output discarded,
    /// in file order; any failure aborts the build.
    pub fn build(files: &[PathBuf], helpers: &Helpers) -> Result<Self, BuildError> {
        let page = files
            .last()
            .and_then(|f| file_stem(f))
            .unwrap_or_default();

        let mut merged: Vec<(String, String)> = Vec::new();
        for file in files {
            let source = std::fs::read_to_string(file).map_err(|source| BuildError::Io {
                path: file.clone(),
                source,
            })?;
            for def in parse_fragments(&source, file)? {
                // last-writer-wins per fragment name
                merged.retain(|(name, _)| *name != def.name);
                merged.push((def.name, def.body));
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(merged.clone())
            .map_err(BuildError::Compile)?;
        helpers.register(&mut tera);

        let names: HashSet<String> = merged.into_iter().map(|(name, _)| name).collect();
        let set = Self { page, tera, names };

        for file in files {
            let Some(stem) = file_stem(file) else { continue };
            let init = format!("init-{stem}");
            if set.names.contains(&init) {
                tracing::debug!(page = %set.page, fragment = %init, "Running init fragment");
                set.tera
                    .render(&init, &tera::Context::new())
                    .map_err(|source| BuildError::Init {
                        fragment: init.clone(),
                        source,
                    })?;
            }
        }

        Ok(set)
    }

    /// Name of the page this set serves (stem of its page file).
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Whether a fragment with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Render the named fragment into `writer`.
    ///
    /// On failure the writer may already hold partial output; the caller
    /// decides what to do with it.
    pub fn render_to(
        &self,
        name: &str,
        context: &tera::Context,
        writer: impl std::io::Write,
    ) -> tera::Result<()> {
        self.tera.render_to(name, context, writer)
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
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

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn later_files_override_earlier_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let shared = write(
            dir.path(),
            "_layout.html",
            "{# fragment http-get #}\nshared\n{# fragment footer #}\nfoot",
        );
        let page = write(dir.path(), "index.html", "{# fragment http-get #}\npage");

        let set = FragmentSet::build(&[shared, page], &helpers(dir.path())).unwrap();
        let mut out = Vec::new();
        set.render_to("http-get", &tera::Context::new(), &mut out)
            .unwrap();
        assert_eq!(out, b"page");
        assert!(set.contains("footer"));
        assert_eq!(set.page(), "index");
    }

    #[test]
    fn syntax_error_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(dir.path(), "index.html", "{# fragment a #}\n{% bogus %}");
        let err = FragmentSet::build(&[page], &helpers(dir.path())).unwrap_err();
        assert!(matches!(err, BuildError::Compile(_)));
    }

    #[test]
    fn init_fragment_runs_during_build() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            "{# fragment init-index #}\n\
             {% set n = exec(sql=\"CREATE TABLE IF NOT EXISTS todos (id TEXT)\") %}\n\
             {# fragment http-get #}\n\
             {{- queryrows(sql=\"SELECT * FROM todos\") | length -}}",
        );

        let helpers = helpers(dir.path());
        let set = FragmentSet::build(&[page], &helpers).unwrap();
        let mut out = Vec::new();
        set.render_to("http-get", &tera::Context::new(), &mut out)
            .unwrap();
        assert_eq!(out, b"0");
    }

    #[test]
    fn failing_init_fragment_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            "{# fragment init-index #}\n{{ exec(sql=\"NOT VALID SQL\") }}",
        );
        let err = FragmentSet::build(&[page], &helpers(dir.path())).unwrap_err();
        assert!(matches!(err, BuildError::Init { .. }));
    }

    #[test]
    fn init_fragments_are_rerunnable_across_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            "{# fragment init-index #}\n\
             {% set n = exec(sql=\"CREATE TABLE IF NOT EXISTS todos (id TEXT)\") %}\n\
             {# fragment http-get #}\nok",
        );

        let helpers = helpers(dir.path());
        FragmentSet::build(std::slice::from_ref(&page), &helpers).unwrap();
        // second build against the same database must succeed too
        FragmentSet::build(&[page], &helpers).unwrap();
    }

    #[test]
    fn missing_fragment_is_a_miss_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(dir.path(), "index.html", "{# fragment http-get #}\nhi");
        let set = FragmentSet::build(&[page], &helpers(dir.path())).unwrap();
        assert!(!set.contains("htmx-get"));
    }

    #[test]
    fn unknown_helper_is_a_render_error_not_a_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            "{# fragment http-get #}\n{{ nosuchhelper() }}",
        );
        let set = FragmentSet::build(&[page], &helpers(dir.path())).unwrap();
        let mut out = Vec::new();
        assert!(set
            .render_to("http-get", &tera::Context::new(), &mut out)
            .is_err());
    }
}
