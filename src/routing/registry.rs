//! The registry capability the builder writes into.
//!
//! # Responsibilities
//! - Define the [`Registry`] trait: the six operations the builder
//!   needs from a router backend
//! - Define the walk item ([`RouteEntry`]) and walk error
//! - Path joining and normalization for mount prefixes and diagnostics
//!
//! # Design Decisions
//! - Registration is write-only: no removal, no rollback
//! - `handle`/`handle_all` may fail so backends can refuse a token
//!   honestly; the builder validates first, so refusal is the backstop
//! - Walk order is registration order, children after their mount

use thiserror::Error;

use crate::routing::builder::BuildError;
use crate::routing::tree::{HttpService, Middleware};

/// One registered (method, path) pair, as enumerated by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Concrete method token, e.g. `"GET"`.
    pub method: String,

    /// Full path from the root, mount prefixes included.
    pub path: String,
}

/// Error produced while enumerating registered routes.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct WalkError(pub String);

/// The surface the route tree builder registers against.
///
/// Implemented by [`Mux`](crate::routing::Mux) over the real router and
/// by fakes in tests.
pub trait Registry: Sized {
    /// Add an ambient middleware for this scope and everything below it.
    fn use_middleware(&mut self, middleware: Middleware);

    /// Register `service` for one concrete method at `pattern`.
    fn handle(&mut self, method: &str, pattern: &str, service: HttpService)
        -> Result<(), BuildError>;

    /// Register `service` for every method at `pattern`.
    fn handle_all(&mut self, pattern: &str, service: HttpService) -> Result<(), BuildError>;

    /// Create a fresh, empty child scope.
    fn child(&self) -> Self;

    /// Nest a finished child scope under `pattern`.
    fn mount(&mut self, pattern: &str, child: Self);

    /// Visit every registered entry; stops at the first visitor error.
    ///
    /// A (method, path) pair is visited at most once, no matter how many
    /// registrations targeted it.
    fn walk<F>(&self, visit: F) -> Result<(), WalkError>
    where
        F: FnMut(&RouteEntry) -> Result<(), WalkError>;
}

/// Join a mount prefix and a path registered below it.
///
/// The child's `"/"` collapses onto the prefix itself, so mounting
/// `"/user"` over a `"/"` endpoint yields `"/user"`.
pub fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{prefix}/{path}")
    }
}

/// Collapse runs of slashes for display. Registration never sees this;
/// it only cleans up walk output.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_collapses_the_root_child() {
        assert_eq!(join("/user", "/"), "/user");
        assert_eq!(join("/user/", "/"), "/user");
    }

    #[test]
    fn join_composes_nested_paths() {
        assert_eq!(join("/user", "/{id}"), "/user/{id}");
        assert_eq!(join("/product/{id}", "/test"), "/product/{id}/test");
        assert_eq!(join("/", "/health"), "/health");
    }

    #[test]
    fn normalize_collapses_slash_runs() {
        assert_eq!(normalize("/user//{id}"), "/user/{id}");
        assert_eq!(normalize("//"), "/");
        assert_eq!(normalize("/a/b"), "/a/b");
        assert_eq!(normalize(""), "/");
    }
}
