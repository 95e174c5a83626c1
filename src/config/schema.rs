//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so the server runs with no config file at all.

use serde::{Deserialize, Serialize};

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Filesystem locations for templates, static assets and the database.
    pub paths: PathsConfig,

    /// Template hot-reload settings.
    pub reload: ReloadConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Filesystem paths used by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding template source files (`*.html`).
    pub templates_dir: String,

    /// Directory served verbatim under `/static/`.
    pub static_dir: String,

    /// SQLite database file backing the SQL template helpers.
    pub database: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: "templates".to_string(),
            static_dir: "static".to_string(),
            database: "todos.db".to_string(),
        }
    }
}

/// Template hot-reload settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Whether to watch the templates directory and rebuild on change.
    pub enabled: bool,

    /// Quiet period after the last change event before rebuilding.
    pub debounce_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 100,
        }
    }
}
