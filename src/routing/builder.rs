//! Recursive tree-to-registry compiler.
//!
//! # Data Flow
//! ```text
//! Route
//!     → ambient middlewares, in declaration order
//!     → endpoint patterns (validate token, fold chain, register)
//!     → subroutes (fresh child scope, recurse, mount on success)
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first invalid method token aborts the whole build
//! - No rollback: registrations made before the failure remain, so a
//!   failed registry must be discarded
//! - Wildcard endpoints register through `handle_all`; an explicit
//!   method at the same pattern still wins for that method

use thiserror::Error;

use crate::routing::methods;
use crate::routing::registry::Registry;
use crate::routing::tree::{EndpointPattern, Route, SubRoute};

/// Error produced while compiling a route tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A method token outside the accepted set was used as an endpoint key.
    #[error("invalid http method: {method} (pattern: {pattern})")]
    InvalidMethod {
        /// The offending token, verbatim.
        method: String,
        /// The pattern it was declared under.
        pattern: String,
    },
}

/// Compile `route` onto `registry`, depth-first.
///
/// On error the registry keeps everything registered before the failure;
/// discard it rather than serving it.
pub fn build<R: Registry>(registry: &mut R, route: Route) -> Result<(), BuildError> {
    for mw in route.middlewares {
        registry.use_middleware(mw);
    }
    for endpoints in route.endpoints {
        build_endpoints(registry, endpoints)?;
    }
    for subroute in route.subroutes {
        build_subroute(registry, subroute)?;
    }
    Ok(())
}

impl Route {
    /// Compile this tree onto `registry`. See [`build`].
    pub fn build<R: Registry>(self, registry: &mut R) -> Result<(), BuildError> {
        build(registry, self)
    }
}

fn build_endpoints<R: Registry>(registry: &mut R, ep: EndpointPattern) -> Result<(), BuildError> {
    let EndpointPattern { pattern, endpoints } = ep;
    for (method, endpoint) in endpoints {
        if !methods::is_allowed(&method) {
            return Err(BuildError::InvalidMethod {
                method,
                pattern,
            });
        }
        let service = endpoint.into_service();
        if method == methods::WILDCARD {
            registry.handle_all(&pattern, service)?;
        } else {
            registry.handle(&method, &pattern, service)?;
        }
    }
    Ok(())
}

fn build_subroute<R: Registry>(registry: &mut R, subroute: SubRoute) -> Result<(), BuildError> {
    let mut child = registry.child();
    build(&mut child, subroute.route)?;
    registry.mount(&subroute.pattern, child);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tower::layer::util::Identity;

    use super::*;
    use crate::routing::registry::{RouteEntry, WalkError};
    use crate::routing::tree::{middleware, Endpoint, HttpService, Middleware};

    /// Registry fake that records operations instead of routing.
    #[derive(Default)]
    struct Recording {
        ops: Vec<String>,
    }

    impl Registry for Recording {
        fn use_middleware(&mut self, _middleware: Middleware) {
            self.ops.push("use".to_string());
        }

        fn handle(
            &mut self,
            method: &str,
            pattern: &str,
            _service: HttpService,
        ) -> Result<(), BuildError> {
            self.ops.push(format!("handle {method} {pattern}"));
            Ok(())
        }

        fn handle_all(&mut self, pattern: &str, _service: HttpService) -> Result<(), BuildError> {
            self.ops.push(format!("all {pattern}"));
            Ok(())
        }

        fn child(&self) -> Self {
            Self::default()
        }

        fn mount(&mut self, pattern: &str, child: Self) {
            for op in child.ops {
                self.ops.push(format!("{pattern} :: {op}"));
            }
        }

        fn walk<F>(&self, _visit: F) -> Result<(), WalkError>
        where
            F: FnMut(&RouteEntry) -> Result<(), WalkError>,
        {
            Ok(())
        }
    }

    fn ok_endpoint() -> Endpoint {
        Endpoint::new(|| async {})
    }

    fn pattern(path: &str, methods: &[&str]) -> EndpointPattern {
        EndpointPattern {
            pattern: path.to_string(),
            endpoints: methods
                .iter()
                .map(|m| (m.to_string(), ok_endpoint()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn empty_tree_registers_nothing() {
        let mut registry = Recording::default();
        build(&mut registry, Route::default()).unwrap();
        assert!(registry.ops.is_empty());
    }

    #[test]
    fn visits_middlewares_then_endpoints_then_subroutes() {
        let tree = Route {
            middlewares: vec![middleware(Identity::new())],
            endpoints: vec![pattern("/", &["GET"])],
            subroutes: vec![SubRoute {
                pattern: "/user".to_string(),
                route: Route {
                    middlewares: Vec::new(),
                    endpoints: vec![pattern("/", &["GET"]), pattern("/{id}", &["DELETE", "GET"])],
                    subroutes: Vec::new(),
                },
            }],
        };

        let mut registry = Recording::default();
        tree.build(&mut registry).unwrap();

        assert_eq!(
            registry.ops,
            vec![
                "use",
                "handle GET /",
                "/user :: handle GET /",
                "/user :: handle DELETE /{id}",
                "/user :: handle GET /{id}",
            ],
        );
    }

    #[test]
    fn wildcard_routes_through_handle_all() {
        let tree = Route {
            middlewares: Vec::new(),
            endpoints: vec![pattern("/all", &["All"])],
            subroutes: Vec::new(),
        };

        let mut registry = Recording::default();
        tree.build(&mut registry).unwrap();

        assert_eq!(registry.ops, vec!["all /all"]);
    }

    #[test]
    fn invalid_method_fails_fast_and_keeps_prior_registrations() {
        let tree = Route {
            middlewares: Vec::new(),
            endpoints: vec![pattern("/ok", &["GET"]), pattern("/test", &["foobar"])],
            subroutes: vec![SubRoute {
                pattern: "/never".to_string(),
                route: Route {
                    middlewares: Vec::new(),
                    endpoints: vec![pattern("/", &["GET"])],
                    subroutes: Vec::new(),
                },
            }],
        };

        let mut registry = Recording::default();
        let err = tree.build(&mut registry).unwrap_err();

        assert_eq!(
            err,
            BuildError::InvalidMethod {
                method: "foobar".to_string(),
                pattern: "/test".to_string(),
            },
        );
        // Fail fast, not fail clean: the earlier endpoint stuck, the
        // subroute after the failure was never mounted.
        assert_eq!(registry.ops, vec!["handle GET /ok"]);
    }

    #[test]
    fn invalid_method_inside_a_subroute_aborts_the_mount() {
        let tree = Route {
            middlewares: Vec::new(),
            endpoints: Vec::new(),
            subroutes: vec![SubRoute {
                pattern: "/user".to_string(),
                route: Route {
                    middlewares: Vec::new(),
                    endpoints: vec![pattern("/", &["foobar"])],
                    subroutes: Vec::new(),
                },
            }],
        };

        let mut registry = Recording::default();
        let err = tree.build(&mut registry).unwrap_err();

        assert!(matches!(err, BuildError::InvalidMethod { .. }));
        assert!(registry.ops.is_empty(), "failed child must not be mounted");
    }

    #[test]
    fn invalid_token_beats_valid_siblings_under_one_pattern() {
        let tree = Route {
            middlewares: Vec::new(),
            endpoints: vec![pattern("/test", &["GET", "foobar"])],
            subroutes: Vec::new(),
        };

        let mut registry = Recording::default();
        let err = tree.build(&mut registry).unwrap_err();

        assert!(matches!(
            err,
            BuildError::InvalidMethod { method, .. } if method == "foobar"
        ));
    }
}
