//! Server-rendered to-do application, one fragment set per page.
//!
//! # Architecture Overview
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                 TODO SERVER                   │
//!                  │                                               │
//!  Request ────────┼─▶ http::server ──▶ routing::route_id          │
//!                  │        │                 │                    │
//!                  │        ▼                 ▼                    │
//!                  │   Site (ArcSwap) ──▶ FragmentSet ──▶ tera     │
//!                  │        ▲                 │            │       │
//!                  │        │                 ▼            ▼       │
//!  templates/* ────┼─▶ templates::watcher   helpers ──▶ sqlite     │
//!                  │   (debounce + rebuild                         │
//!                  │    + atomic swap)                             │
//!                  └──────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_fragments::config::{load_config, AppConfig};
use todo_fragments::db::Db;
use todo_fragments::helpers::Helpers;
use todo_fragments::http::{AppState, HttpServer};
use todo_fragments::templates::site::Site;
use todo_fragments::templates::watcher::TemplateWatcher;

#[derive(Parser, Debug)]
#[command(about = "Fragment-routed, server-rendered to-do application")]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_fragments=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        templates_dir = %config.paths.templates_dir,
        database = %config.paths.database,
        reload = config.reload.enabled,
        "Configuration loaded"
    );

    let db = Arc::new(Db::open(&config.paths.database)?);
    let helpers = Arc::new(Helpers::new(db));
    tracing::debug!(helpers = ?Helpers::names(), "Helper registry ready");

    let templates_dir = Path::new(&config.paths.templates_dir);
    let site = Site::build(templates_dir, &helpers)?;
    let site = Arc::new(ArcSwap::from_pointee(site));

    // Kept alive for the lifetime of the server; dropping it stops reloads.
    let _watcher = if config.reload.enabled {
        let watcher = TemplateWatcher::new(
            templates_dir,
            Duration::from_millis(config.reload.debounce_ms),
        );
        Some(watcher.run(helpers.clone(), site.clone())?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, AppState { site });
    server.run(listener).await?;

    tracing::info!("Bye");
    Ok(())
}
