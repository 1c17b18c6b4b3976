//! The declarative route tree.
//!
//! # Responsibilities
//! - Define the tree types callers assemble: [`Route`], [`SubRoute`],
//!   [`EndpointPattern`], [`Endpoint`]
//! - Erase handler and middleware types so heterogeneous chains can
//!   live in one `Vec`
//!
//! # Design Decisions
//! - Trees are plain data; nothing is registered until they are built
//! - Handlers and layers are boxed once at construction, not per request
//! - Method keys use a `BTreeMap` for deterministic iteration

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::body::Body;
use axum::handler::Handler;
use axum::http::Request;
use axum::response::Response;
use tower::util::{BoxCloneSyncService, BoxCloneSyncServiceLayer};
use tower::{Layer, Service};

/// A type-erased request handler: the leaf every endpoint wraps.
pub type HttpService = BoxCloneSyncService<Request<Body>, Response, Infallible>;

/// A type-erased middleware: wraps an [`HttpService`] in another.
pub type Middleware = BoxCloneSyncServiceLayer<HttpService, Request<Body>, Response, Infallible>;

/// One level of the route tree.
///
/// `middlewares` wrap every endpoint reachable beneath this level,
/// including those inside `subroutes`, in declaration order (the first
/// declared middleware is outermost).
#[derive(Clone, Default)]
pub struct Route {
    /// Middlewares ambient to this level and everything below it.
    pub middlewares: Vec<Middleware>,

    /// Endpoint patterns registered directly at this level.
    pub endpoints: Vec<EndpointPattern>,

    /// Nested routes mounted under a path prefix.
    pub subroutes: Vec<SubRoute>,
}

/// A nested route mounted under `pattern`.
///
/// Paths inside `route` are relative to the mount point.
#[derive(Clone)]
pub struct SubRoute {
    /// Mount prefix, e.g. `"/user"`.
    pub pattern: String,

    /// The tree below the mount point.
    pub route: Route,
}

/// Endpoints sharing one path pattern, keyed by method token.
///
/// Keys must be members of the accepted method set, including the
/// `"All"` wildcard; the builder rejects anything else.
#[derive(Clone)]
pub struct EndpointPattern {
    /// Path pattern in the underlying router's syntax, e.g. `"/{id}"`.
    pub pattern: String,

    /// Method token to endpoint. Keys are unique by construction.
    pub endpoints: BTreeMap<String, Endpoint>,
}

/// A handler plus its endpoint-local middleware chain.
#[derive(Clone)]
pub struct Endpoint {
    /// Middlewares wrapping only this endpoint, first declared outermost.
    pub middlewares: Vec<Middleware>,

    /// The handler at the center of the chain.
    pub handler: HttpService,
}

impl Endpoint {
    /// Wrap an axum handler into an endpoint with no extra middleware.
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, ()> + Sync,
        T: 'static,
    {
        Self {
            middlewares: Vec::new(),
            handler: HttpService::new(handler.with_state(())),
        }
    }

    /// Append a middleware to this endpoint's chain.
    pub fn with<L>(mut self, layer: L) -> Self
    where
        L: Layer<HttpService> + Send + Sync + 'static,
        L::Service: Service<Request<Body>, Response = Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request<Body>>>::Future: Send + 'static,
    {
        self.middlewares.push(middleware(layer));
        self
    }

    /// Fold the middleware chain around the handler, first declared
    /// outermost, yielding the service to register.
    pub fn into_service(self) -> HttpService {
        self.middlewares
            .into_iter()
            .rev()
            .fold(self.handler, |service, mw| mw.layer(service))
    }
}

/// Erase a tower layer into a [`Middleware`].
pub fn middleware<L>(layer: L) -> Middleware
where
    L: Layer<HttpService> + Send + Sync + 'static,
    L::Service: Service<Request<Body>, Response = Response, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    <L::Service as Service<Request<Body>>>::Future: Send + 'static,
{
    BoxCloneSyncServiceLayer::new(layer)
}
