//! End-to-end discovery against real HTTP servers on ephemeral ports.

use std::net::SocketAddr;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use mcpdeploy_core::{ConnectionType, DiscoveryConfig, ServiceProfile};
use mcpdeploy_discovery::DiscoveryEngine;
use mcpdeploy_runtime::lockfile::write_url_marker;
use tokio::net::TcpListener;

async fn spawn_server(status: StatusCode) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/health", get(move || async move { (status, "ok") }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

fn config_for(service: &str, profile: ServiceProfile) -> DiscoveryConfig {
    let mut config = DiscoveryConfig::empty();
    config.services.insert(service.to_owned(), profile);
    config
}

#[tokio::test]
async fn known_port_with_healthy_server_is_discovered() {
    let addr = spawn_server(StatusCode::OK).await;
    let locks = tempfile::tempdir().unwrap();
    let engine = DiscoveryEngine::builder(config_for(
        "it-known-port",
        ServiceProfile {
            known_ports: vec![addr.port()],
            ..ServiceProfile::default()
        },
    ))
    .with_lock_dir(locks.path())
    .build()
    .unwrap();

    let connection = engine.discover_server("it-known-port").await.unwrap();

    assert_eq!(connection.url(), format!("http://localhost:{}", addr.port()));
    assert_eq!(connection.connection_type(), ConnectionType::External);
    assert_eq!(engine.get_cached_connection("it-known-port"), Some(connection));
}

#[tokio::test]
async fn known_port_with_failing_health_is_ignored() {
    let addr = spawn_server(StatusCode::SERVICE_UNAVAILABLE).await;
    let locks = tempfile::tempdir().unwrap();
    let engine = DiscoveryEngine::builder(config_for(
        "it-unhealthy-port",
        ServiceProfile {
            known_ports: vec![addr.port()],
            ..ServiceProfile::default()
        },
    ))
    .with_lock_dir(locks.path())
    .build()
    .unwrap();

    assert!(engine.find_existing_deployment("it-unhealthy-port").await.is_none());
}

#[tokio::test]
async fn url_marker_from_earlier_deployment_is_discovered() {
    let addr = spawn_server(StatusCode::OK).await;
    let locks = tempfile::tempdir().unwrap();
    let url = format!("http://127.0.0.1:{}", addr.port());
    write_url_marker(locks.path(), "it-marker", &url).unwrap();

    let engine = DiscoveryEngine::builder(config_for("it-marker", ServiceProfile::default()))
        .with_lock_dir(locks.path())
        .build()
        .unwrap();

    let connection = engine.find_existing_deployment("it-marker").await.unwrap();

    assert_eq!(connection.url(), url);
    assert_eq!(connection.connection_type(), ConnectionType::User);
}

#[tokio::test]
async fn nothing_running_is_not_found() {
    let locks = tempfile::tempdir().unwrap();
    let engine = DiscoveryEngine::builder(config_for("it-nothing", ServiceProfile::default()))
        .with_lock_dir(locks.path())
        .build()
        .unwrap();

    assert!(engine.find_existing_deployment("it-nothing").await.is_none());
    assert!(engine.discover_server("it-nothing").await.is_err());
}
