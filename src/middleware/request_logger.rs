//! Structured request logging.
//!
//! # Responsibilities
//! - Emit exactly one INFO record per completed request: status, method,
//!   selected request headers, remote address, protocol, path, latency,
//!   response size, correlation ID
//! - Suppress records for health-probe traffic (user-agent prefix match)
//!
//! # Design Decisions
//! - Requests and responses pass through untouched; this layer only
//!   observes
//! - Header values are logged verbatim; redaction belongs to the log
//!   pipeline, not the middleware
//! - Response size comes from the `content-length` header; streaming
//!   responses without one count as 0

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::header::{self, AsHeaderName};
use axum::http::{HeaderMap, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::middleware::request_id::RequestId;

/// User-agent prefix whose requests are not logged.
pub const PROBE_USER_AGENT: &str = "kube-probe";

/// Layer recording one log line per completed request.
#[derive(Debug, Clone)]
pub struct RequestLoggerLayer {
    probe_prefix: String,
}

impl RequestLoggerLayer {
    /// Logger suppressing the default probe user-agent.
    pub fn new() -> Self {
        Self {
            probe_prefix: PROBE_USER_AGENT.to_string(),
        }
    }

    /// Override the user-agent prefix that suppresses logging.
    pub fn probe_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.probe_prefix = prefix.into();
        self
    }
}

impl Default for RequestLoggerLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLogger<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogger {
            inner,
            probe_prefix: self.probe_prefix.clone(),
        }
    }
}

/// Service produced by [`RequestLoggerLayer`].
#[derive(Debug, Clone)]
pub struct RequestLogger<S> {
    inner: S,
    probe_prefix: String,
}

impl<S, B, ResBody> Service<Request<B>> for RequestLogger<S>
where
    S: Service<Request<B>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = RequestLoggerFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let headers = req.headers();
        let user_agent = header_value(headers, header::USER_AGENT);
        let record = if is_probe(&user_agent, &self.probe_prefix) {
            None
        } else {
            Some(RequestRecord {
                method: req.method().to_string(),
                path: req.uri().path().to_string(),
                proto: format!("{:?}", req.version()),
                remote_addr: req
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.to_string())
                    .unwrap_or_default(),
                forwarded_for: header_value(headers, "x-forwarded-for"),
                request_id: req
                    .extensions()
                    .get::<RequestId>()
                    .map(|id| id.as_str().to_string())
                    .unwrap_or_default(),
                content_type: header_value(headers, header::CONTENT_TYPE),
                content_length: header_value(headers, header::CONTENT_LENGTH),
                user_agent,
                server: header_value(headers, header::SERVER),
                via: header_value(headers, header::VIA),
                accept: header_value(headers, header::ACCEPT),
                authorization: header_value(headers, header::AUTHORIZATION),
            })
        };

        RequestLoggerFuture {
            inner: self.inner.call(req),
            start: Instant::now(),
            record,
        }
    }
}

/// Request-side fields captured before the inner service runs.
struct RequestRecord {
    method: String,
    path: String,
    proto: String,
    remote_addr: String,
    forwarded_for: String,
    request_id: String,
    content_type: String,
    content_length: String,
    user_agent: String,
    server: String,
    via: String,
    accept: String,
    authorization: String,
}

pin_project! {
    /// Response future for [`RequestLogger`]; logs on completion.
    pub struct RequestLoggerFuture<F> {
        #[pin]
        inner: F,
        start: Instant,
        record: Option<RequestRecord>,
    }
}

impl<F, ResBody, E> Future for RequestLoggerFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                if let Some(record) = this.record.take() {
                    let latency_ms = this.start.elapsed().as_secs_f64() * 1000.0;
                    match &result {
                        Ok(response) => {
                            let size = header_value(response.headers(), header::CONTENT_LENGTH)
                                .parse::<u64>()
                                .unwrap_or(0);
                            tracing::info!(
                                status = response.status().as_u16(),
                                method = %record.method,
                                content_type = %record.content_type,
                                content_length = %record.content_length,
                                user_agent = %record.user_agent,
                                server = %record.server,
                                via = %record.via,
                                accept = %record.accept,
                                authorization = %record.authorization,
                                x_forwarded_for = %record.forwarded_for,
                                remote_addr = %record.remote_addr,
                                proto = %record.proto,
                                path = %record.path,
                                latency_ms = latency_ms,
                                size = size,
                                request_id = %record.request_id,
                                "Request completed"
                            );
                        }
                        Err(_) => {
                            tracing::error!(
                                method = %record.method,
                                path = %record.path,
                                latency_ms = latency_ms,
                                request_id = %record.request_id,
                                "Request failed"
                            );
                        }
                    }
                }
                Poll::Ready(result)
            }
        }
    }
}

/// True when the request comes from the configured health probe.
fn is_probe(user_agent: &str, probe_prefix: &str) -> bool {
    user_agent.starts_with(probe_prefix)
}

fn header_value(headers: &HeaderMap, name: impl AsHeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
