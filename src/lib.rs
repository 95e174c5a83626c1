//! Server-rendered to-do application with fragment routing.
//!
//! One set of named template fragments serves both full-page navigations and
//! partial htmx updates. Each incoming request is classified into a route id
//! derived from its method, the `HX-Request` marker header, and the set of
//! its query parameter names; the route id selects which fragment renders.

pub mod config;
pub mod db;
pub mod helpers;
pub mod http;
pub mod lifecycle;
pub mod routing;
pub mod templates;

pub use config::schema::AppConfig;
pub use db::Db;
pub use http::HttpServer;
pub use templates::set::FragmentSet;
pub use templates::site::Site;
