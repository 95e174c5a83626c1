//! Template file watcher for hot reload.
//!
//! # Design Decisions
//! - Change events are debounced: a rebuild starts only after a quiet period,
//!   so an editor writing several files triggers one rebuild
//! - The new Site is built completely off to the side (file I/O, compilation,
//!   init fragments) and published with one atomic swap on success
//! - A failed rebuild logs the error and keeps the current Site serving;
//!   in-flight requests always finish against whichever Site they captured

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::helpers::Helpers;
use crate::templates::site::Site;

/// Watches the templates directory and republishes the site on change.
pub struct TemplateWatcher {
    templates_dir: PathBuf,
    debounce: Duration,
}

impl TemplateWatcher {
    pub fn new(templates_dir: &Path, debounce: Duration) -> Self {
        Self {
            templates_dir: templates_dir.to_path_buf(),
            debounce,
        }
    }

    /// Start watching in the background.
    ///
    /// Returns the filesystem watcher; dropping it stops the whole pipeline.
    pub fn run(
        self,
        helpers: Arc<Helpers>,
        site: Arc<ArcSwap<Site>>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&self.templates_dir, RecursiveMode::Recursive)?;
        tracing::info!(path = ?self.templates_dir, "Template watcher started");

        tokio::spawn(rebuild_loop(self.templates_dir, self.debounce, rx, helpers, site));

        Ok(watcher)
    }
}

async fn rebuild_loop(
    templates_dir: PathBuf,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<()>,
    helpers: Arc<Helpers>,
    site: Arc<ArcSwap<Site>>,
) {
    while rx.recv().await.is_some() {
        // absorb the burst: wait until no event arrives for a full quiet period
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        tracing::info!("Template change detected, rebuilding site...");
        let dir = templates_dir.clone();
        let helpers = helpers.clone();
        let built =
            tokio::task::spawn_blocking(move || Site::build(&dir, &helpers)).await;

        match built {
            Ok(Ok(new_site)) => {
                site.store(Arc::new(new_site));
                tracing::info!("New site published");
            }
            Ok(Err(e)) => {
                tracing::error!("Rebuild failed: {e}. Keeping current site.");
            }
            Err(e) => {
                tracing::error!("Rebuild task panicked: {e}. Keeping current site.");
            }
        }
    }
}
