//! The axum-backed registry.
//!
//! # Responsibilities
//! - Implement [`Registry`] over `axum::Router`
//! - Register the fixed `GET /health` endpoint at construction
//! - Track a [`RouteEntry`] per registration so the router can be walked
//!   (axum has no route enumeration of its own)
//! - Finalize collected middlewares so the first declared is outermost
//!
//! # Design Decisions
//! - Layers are collected during the build and applied on finalization
//!   in reverse, because axum applies the last `.layer` call outermost
//! - A wildcard registration becomes the method fallback, so an explicit
//!   method at the same pattern wins for that method
//! - Each (method, path) pair gets one entry, so a wildcard and an
//!   explicit method overlapping at a pattern walk as a single entry
//! - Duplicate or conflicting registrations are left to axum, which
//!   panics; this type does not try to catch them first

use axum::http::StatusCode;
use axum::routing::{any_service, get, on_service, MethodRouter, Route};
use axum::Router;
use tower::layer::layer_fn;
use tower::Layer;

use crate::routing::builder::BuildError;
use crate::routing::methods;
use crate::routing::registry::{self, Registry, RouteEntry, WalkError};
use crate::routing::tree::{HttpService, Middleware};

/// Registry over the real router. Create one with [`Mux::new`], build a
/// tree onto it, then take the router with [`Mux::into_router`].
pub struct Mux {
    router: Router,
    layers: Vec<Middleware>,
    entries: Vec<RouteEntry>,
}

impl Mux {
    /// A root scope with the fixed health endpoint already registered.
    pub fn new() -> Self {
        let router = Router::new().route("/health", get(|| async { StatusCode::OK }));
        Self {
            router,
            layers: Vec::new(),
            entries: vec![RouteEntry {
                method: "GET".to_string(),
                path: "/health".to_string(),
            }],
        }
    }

    /// Finalize this scope and yield the router to serve.
    pub fn into_router(self) -> Router {
        finalize(self.router, self.layers)
    }

    fn add_route(&mut self, pattern: &str, route: MethodRouter) {
        let router = std::mem::take(&mut self.router);
        self.router = router.route(pattern, route);
    }

    // Skips pairs already recorded, e.g. an explicit method at a pattern
    // a wildcard already covers.
    fn record_entry(&mut self, method: &str, path: String) {
        let seen = self
            .entries
            .iter()
            .any(|entry| entry.method == method && entry.path == path);
        if !seen {
            self.entries.push(RouteEntry {
                method: method.to_string(),
                path,
            });
        }
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for Mux {
    fn use_middleware(&mut self, middleware: Middleware) {
        self.layers.push(middleware);
    }

    fn handle(
        &mut self,
        method: &str,
        pattern: &str,
        service: HttpService,
    ) -> Result<(), BuildError> {
        let filter = methods::filter(method).ok_or_else(|| BuildError::InvalidMethod {
            method: method.to_string(),
            pattern: pattern.to_string(),
        })?;
        self.add_route(pattern, on_service(filter, service));
        self.record_entry(method, pattern.to_string());
        Ok(())
    }

    fn handle_all(&mut self, pattern: &str, service: HttpService) -> Result<(), BuildError> {
        self.add_route(pattern, any_service(service));
        // The walk reports what is reachable, one entry per concrete
        // method, the same way the wildcard would enumerate.
        for method in methods::concrete() {
            self.record_entry(method, pattern.to_string());
        }
        Ok(())
    }

    fn child(&self) -> Self {
        Self {
            router: Router::new(),
            layers: Vec::new(),
            entries: Vec::new(),
        }
    }

    fn mount(&mut self, pattern: &str, child: Self) {
        let Mux {
            router: child_router,
            layers,
            entries,
        } = child;
        let child_router = finalize(child_router, layers);
        let router = std::mem::take(&mut self.router);
        self.router = router.nest(pattern, child_router);
        for entry in entries {
            self.record_entry(&entry.method, registry::join(pattern, &entry.path));
        }
    }

    fn walk<F>(&self, mut visit: F) -> Result<(), WalkError>
    where
        F: FnMut(&RouteEntry) -> Result<(), WalkError>,
    {
        for entry in &self.entries {
            visit(entry)?;
        }
        Ok(())
    }
}

/// Apply collected layers in reverse declaration order, so the first
/// declared middleware ends up outermost.
fn finalize(router: Router, layers: Vec<Middleware>) -> Router {
    layers.into_iter().rev().fold(router, |router, mw| {
        router.layer(layer_fn(move |route: Route| {
            mw.layer(HttpService::new(route))
        }))
    })
}
