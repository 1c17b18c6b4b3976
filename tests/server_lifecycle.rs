//! Integration tests for server startup, drain, and shutdown bounds.

use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use routekit::config::AppConfig;
use routekit::lifecycle::Shutdown;
use routekit::server::{Server, ServerError};

async fn bind_local() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("http://{addr}"))
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_serves_and_drains_in_flight_requests() {
    let (listener, url) = bind_local().await;
    let router = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "slow"
            }),
        );

    let mut config = AppConfig::default();
    config.timeouts.shutdown_grace_secs = 5;
    let server = Server::from_listener(config, router, listener);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(shutdown.subscribe()));

    let response = client().get(&url).send().await.expect("Server unreachable");
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");

    let slow_url = format!("{url}/slow");
    let slow = tokio::spawn(async move { client().get(&slow_url).send().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    let response = slow
        .await
        .unwrap()
        .expect("In-flight request should complete during drain");
    assert_eq!(response.text().await.unwrap(), "slow");

    let result = handle.await.unwrap();
    assert!(result.is_ok(), "Drain should succeed, got {result:?}");
}

#[tokio::test]
async fn test_shutdown_is_bounded_by_the_grace_period() {
    let (listener, url) = bind_local().await;
    let router = Router::new().route(
        "/hang",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "late"
        }),
    );

    let mut config = AppConfig::default();
    // Keep the response deadline out of the way; only the grace period
    // should end this test.
    config.timeouts.write_secs = 60;
    config.timeouts.shutdown_grace_secs = 1;
    let server = Server::from_listener(config, router, listener);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(shutdown.subscribe()));

    let hang_url = format!("{url}/hang");
    let hang = tokio::spawn(async move { client().get(&hang_url).send().await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.trigger();

    let result = handle.await.unwrap();
    match result {
        Err(ServerError::ShutdownTimeout { grace }) => {
            assert_eq!(grace, Duration::from_secs(1));
        }
        other => panic!("expected a shutdown timeout, got {other:?}"),
    }
    hang.abort();
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    // Hold the port open so the second bind deterministically fails.
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = occupied.local_addr().unwrap();

    let mut config = AppConfig::default();
    config.listener.bind_address = addr.to_string();
    let server = Server::new(config, Router::new());
    let configured = server.config().listener.bind_address.clone();

    let shutdown = Shutdown::new();
    let result = server.run(shutdown.subscribe()).await;

    match result {
        Err(ServerError::Bind { addr: reported, .. }) => {
            assert_eq!(reported, configured);
        }
        other => panic!("expected a bind error, got {other:?}"),
    }
}
