//! HTTP server bootstrap and lifecycle.
//!
//! # Responsibilities
//! - Bind the TCP listener (or accept a pre-bound one for tests)
//! - Apply transport timeouts around the finished router
//! - Serve until a shutdown is triggered, then drain within the grace period
//!
//! # Design Decisions
//! - Timeouts come from configuration, not code: `read_secs` bounds request
//!   body reads, `write_secs` bounds response production
//! - Draining is bounded; a hung handler cannot stall shutdown forever

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::map_request_body::MapRequestBodyLayer;
use tower_http::timeout::{TimeoutBody, TimeoutLayer};

use crate::config::AppConfig;
use crate::lifecycle::ShutdownListener;

/// Error type for the serve loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Error while draining connections: {0}")]
    Drain(#[source] std::io::Error),

    #[error("Shutdown timed out after {} seconds", .grace.as_secs())]
    ShutdownTimeout { grace: Duration },
}

/// HTTP server for a compiled router.
pub struct Server {
    config: AppConfig,
    router: Router,
    listener: Option<TcpListener>,
}

impl Server {
    /// Create a server that binds `listener.bind_address` when run.
    pub fn new(config: AppConfig, router: Router) -> Self {
        Self {
            config,
            router,
            listener: None,
        }
    }

    /// Create a server on an already-bound listener.
    ///
    /// Used by tests to bind port 0 and discover the address before serving.
    pub fn from_listener(config: AppConfig, router: Router, listener: TcpListener) -> Self {
        Self {
            config,
            router,
            listener: Some(listener),
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight
    /// connections for at most the configured grace period.
    pub async fn run(self, mut shutdown: ShutdownListener) -> Result<(), ServerError> {
        let Server {
            config,
            router,
            listener,
        } = self;

        let listener = match listener {
            Some(listener) => listener,
            None => TcpListener::bind(&config.listener.bind_address)
                .await
                .map_err(|source| ServerError::Bind {
                    addr: config.listener.bind_address.clone(),
                    source,
                })?,
        };
        let addr = listener.local_addr().map_err(ServerError::Serve)?;

        let read = Duration::from_secs(config.timeouts.read_secs);
        let write = Duration::from_secs(config.timeouts.write_secs);
        let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);

        // Outermost layer wraps the request body so the read timeout covers
        // every poll of the body, wherever the handler consumes it.
        let app = router
            .layer(TimeoutLayer::new(write))
            .layer(MapRequestBodyLayer::new(move |body| {
                Body::new(TimeoutBody::new(read, body))
            }));

        tracing::info!(address = %addr, "Server is ready to handle requests");

        let (drain_tx, drain_rx) = oneshot::channel::<()>();
        let serve = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = drain_rx.await;
        });
        let mut serve = std::pin::pin!(serve.into_future());

        tokio::select! {
            biased;
            result = &mut serve => {
                return result.map_err(ServerError::Serve);
            }
            _ = shutdown.recv() => {
                tracing::info!("Server is shutting down");
            }
        }

        let _ = drain_tx.send(());
        match tokio::time::timeout(grace, serve).await {
            Ok(Ok(())) => {
                tracing::info!("Server stopped");
                Ok(())
            }
            Ok(Err(source)) => Err(ServerError::Drain(source)),
            Err(_) => Err(ServerError::ShutdownTimeout { grace }),
        }
    }
}
