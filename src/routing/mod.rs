//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Declarative tree (tree.rs)
//!     → builder.rs (pre-order traversal, method validation)
//!     → Registry capability (registry.rs)
//!     → Mux over axum::Router (mux.rs)
//!     → Router ready to serve
//!
//! At startup:
//!     log.rs walks the finished registry
//!     → one DEBUG line per (method, path)
//! ```
//!
//! # Design Decisions
//! - Trees are data; nothing registers until `build` runs
//! - Method tokens validated against a fixed whitelist, fail fast
//! - Middleware order: first declared is outermost, across subroutes
//! - Duplicate patterns are delegated to axum (panics), not caught here

pub mod builder;
pub mod log;
pub mod methods;
pub mod mux;
pub mod registry;
pub mod tree;

pub use builder::{build, BuildError};
pub use log::log_routes;
pub use mux::Mux;
pub use registry::{Registry, RouteEntry, WalkError};
pub use tree::{middleware, Endpoint, EndpointPattern, HttpService, Middleware, Route, SubRoute};
