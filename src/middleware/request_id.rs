//! Request correlation IDs.
//!
//! # Responsibilities
//! - Reuse an inbound `x-request-id` header when the client sent one
//! - Generate a UUID v4 otherwise
//! - Expose the ID to inner services via request extensions
//!
//! # Design Decisions
//! - The ID is not echoed on the response; it exists for log correlation
//! - Runs outermost so every inner layer sees the extension

use std::task::{Context, Poll};

use axum::http::{HeaderMap, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying an inbound correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID attached to each request's extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an existing ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh UUID v4 ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Take the inbound `x-request-id` header, or generate a UUID v4 when
/// it is missing, empty, or not valid UTF-8.
pub fn extract_or_generate(headers: &HeaderMap) -> RequestId {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(RequestId::new)
        .unwrap_or_else(RequestId::generate)
}

/// Layer attaching a [`RequestId`] to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let id = extract_or_generate(req.headers());
        req.extensions_mut().insert(id);
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reuses_the_inbound_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("test-123"));

        let id = extract_or_generate(&headers);
        assert_eq!(id.as_str(), "test-123");
    }

    #[test]
    fn generates_when_the_header_is_missing() {
        let id = extract_or_generate(&HeaderMap::new());
        assert_eq!(id.as_str().len(), 36);
        assert!(id.as_str().contains('-'));
    }

    #[test]
    fn generates_when_the_header_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static(""));

        let id = extract_or_generate(&headers);
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
