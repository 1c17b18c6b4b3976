//! Declarative HTTP route registration on top of Axum.

pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod server;

pub use config::AppConfig;
pub use lifecycle::Shutdown;
pub use routing::{Mux, Route};
pub use server::Server;
