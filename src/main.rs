//! routekit
//!
//! Declarative HTTP route registration on top of Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!   Route tree (data)          compile                    serve
//!   ┌────────────────┐   ┌──────────────────┐   ┌──────────────────────┐
//!   │ middlewares    │   │ build()          │   │ Server               │
//!   │ endpoints      │──▶│  validate method │──▶│  transport timeouts  │
//!   │ subroutes ──┐  │   │  register routes │   │  graceful shutdown   │
//!   └─────────────┼──┘   │  mount children  │   └──────────────────────┘
//!                 │      └──────────────────┘
//!                 └── recurses: each subroute is itself a route tree
//! ```
//!
//! The binary wires a demo tree through the full path: load config, build
//! the mux, log the registered routes, serve with interrupt handling.

use std::collections::BTreeMap;

use axum::extract::Path;
use axum::http::StatusCode;

use routekit::config::AppConfig;
use routekit::lifecycle::{listen_for_interrupt, Shutdown};
use routekit::logging::{self, LogConfig};
use routekit::middleware::{RequestIdLayer, RequestLoggerLayer};
use routekit::routing::{
    log_routes, middleware, Endpoint, EndpointPattern, Mux, Route, SubRoute,
};
use routekit::server::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&LogConfig::from_env());

    tracing::info!("routekit v0.1.0 starting");

    let config = AppConfig::load()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        read_secs = config.timeouts.read_secs,
        write_secs = config.timeouts.write_secs,
        shutdown_grace_secs = config.timeouts.shutdown_grace_secs,
        "Configuration loaded"
    );

    let mut mux = Mux::new();
    routes().build(&mut mux)?;
    log_routes(&mux);

    let shutdown = Shutdown::new();
    listen_for_interrupt(shutdown.clone());

    let server = Server::new(config, mux.into_router());
    if let Err(error) = server.run(shutdown.subscribe()).await {
        tracing::error!(error = %error, "Server failed");
        return Err(error.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Demo route tree: request ID and request logging at the root, an index
/// endpoint, and a `/user` subtree.
fn routes() -> Route {
    Route {
        middlewares: vec![
            middleware(RequestIdLayer),
            middleware(RequestLoggerLayer::new()),
        ],
        endpoints: vec![EndpointPattern {
            pattern: "/".to_string(),
            endpoints: BTreeMap::from([("GET".to_string(), Endpoint::new(index))]),
        }],
        subroutes: vec![SubRoute {
            pattern: "/user".to_string(),
            route: Route {
                middlewares: Vec::new(),
                endpoints: vec![
                    EndpointPattern {
                        pattern: "/".to_string(),
                        endpoints: BTreeMap::from([
                            ("GET".to_string(), Endpoint::new(list_users)),
                            ("POST".to_string(), Endpoint::new(create_user)),
                        ]),
                    },
                    EndpointPattern {
                        pattern: "/{id}".to_string(),
                        endpoints: BTreeMap::from([("GET".to_string(), Endpoint::new(get_user))]),
                    },
                ],
                subroutes: Vec::new(),
            },
        }],
    }
}

async fn index() -> &'static str {
    "routekit"
}

async fn list_users() -> &'static str {
    "users"
}

async fn create_user() -> (StatusCode, &'static str) {
    (StatusCode::CREATED, "created")
}

async fn get_user(Path(id): Path<String>) -> String {
    format!("user {id}")
}
