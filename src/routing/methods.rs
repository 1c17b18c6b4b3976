//! HTTP method validation.
//!
//! # Responsibilities
//! - Define the accepted method tokens (nine concrete methods plus the
//!   `"All"` wildcard)
//! - Test tokens for membership (exact, case-sensitive)
//! - Map concrete tokens to the underlying router's method filter
//!
//! # Design Decisions
//! - Case-sensitive: `"get"` is rejected, only `"GET"` registers
//! - The wildcard has no filter; it is registered as a method fallback

use axum::routing::MethodFilter;

/// The wildcard token: matches every method at its pattern.
pub const WILDCARD: &str = "All";

/// Accepted method tokens, the wildcard first.
pub const METHODS: [&str; 10] = [
    WILDCARD, "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE",
];

/// Returns true if `method` is an accepted token. Exact match only.
pub fn is_allowed(method: &str) -> bool {
    METHODS.contains(&method)
}

/// Map a concrete method token to its router filter.
///
/// Returns `None` for the wildcard and for unrecognized tokens.
pub fn filter(method: &str) -> Option<MethodFilter> {
    match method {
        "GET" => Some(MethodFilter::GET),
        "HEAD" => Some(MethodFilter::HEAD),
        "POST" => Some(MethodFilter::POST),
        "PUT" => Some(MethodFilter::PUT),
        "PATCH" => Some(MethodFilter::PATCH),
        "DELETE" => Some(MethodFilter::DELETE),
        "CONNECT" => Some(MethodFilter::CONNECT),
        "OPTIONS" => Some(MethodFilter::OPTIONS),
        "TRACE" => Some(MethodFilter::TRACE),
        _ => None,
    }
}

/// Iterate the concrete method tokens (everything but the wildcard).
pub fn concrete() -> impl Iterator<Item = &'static str> {
    METHODS.into_iter().filter(|m| *m != WILDCARD)
}
