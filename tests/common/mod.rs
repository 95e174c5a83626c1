//! Shared utilities for integration testing.

// not every test target uses every helper
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::net::TcpListener;

use todo_fragments::config::AppConfig;
use todo_fragments::db::Db;
use todo_fragments::helpers::Helpers;
use todo_fragments::http::{AppState, HttpServer};
use todo_fragments::templates::site::Site;
use todo_fragments::templates::watcher::TemplateWatcher;

/// A running server over a temp directory of templates and a fresh database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub templates_dir: PathBuf,
    pub db: Arc<Db>,
    pub site: Arc<ArcSwap<Site>>,
    _dir: tempfile::TempDir,
    _watcher: Option<notify::RecommendedWatcher>,
}

impl TestApp {
    /// Write `templates` (file name, content) into a fresh directory and
    /// serve them on an ephemeral port.
    pub async fn start(templates: &[(&str, &str)]) -> Self {
        Self::start_inner(templates, false).await
    }

    /// Like `start`, but with the template watcher running.
    pub async fn start_with_reload(templates: &[(&str, &str)]) -> Self {
        Self::start_inner(templates, true).await
    }

    async fn start_inner(templates: &[(&str, &str)], reload: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("templates");
        let static_dir = dir.path().join("static");
        std::fs::create_dir(&templates_dir).unwrap();
        std::fs::create_dir(&static_dir).unwrap();
        std::fs::write(static_dir.join("app.css"), "body { margin: 0 }").unwrap();
        for (name, content) in templates {
            std::fs::write(templates_dir.join(name), content).unwrap();
        }

        let db = Arc::new(Db::open(dir.path().join("test.db")).unwrap());
        let helpers = Arc::new(Helpers::new(db.clone()));
        let site = Arc::new(ArcSwap::from_pointee(
            Site::build(&templates_dir, &helpers).unwrap(),
        ));

        let watcher = if reload {
            let watcher = TemplateWatcher::new(&templates_dir, Duration::from_millis(20));
            Some(watcher.run(helpers.clone(), site.clone()).unwrap())
        } else {
            None
        };

        let mut config = AppConfig::default();
        config.paths.static_dir = static_dir.to_string_lossy().into_owned();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = HttpServer::new(&config, AppState { site: site.clone() }).into_router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            templates_dir,
            db,
            site,
            _dir: dir,
            _watcher: watcher,
        }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
