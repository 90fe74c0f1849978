//! Discover command handler.
//!
//! Returns a usable connection for a service, deploying one when nothing
//! healthy is running.

use anyhow::Result;
use mcpdeploy_core::ConnectionType;
use mcpdeploy_core::paths::log_file_name;
use mcpdeploy_discovery::DiscoveryEngine;
use tracing::debug;

use super::print_connection;
use crate::error::CliError;

/// Execute the discover command.
///
/// A server spawned here keeps running after the command exits; later
/// invocations find it through its URL marker.
///
/// # Errors
///
/// Fails with the engine's [`DiscoveryError`](mcpdeploy_core::DiscoveryError)
/// when no strategy exists, memory is short, the deployment lock times out
/// or the deployment itself fails.
pub async fn execute(engine: &DiscoveryEngine, name: &str, json: bool) -> Result<()> {
    debug!(service = name, lock_dir = %engine.lock_dir().display(), "Discovering");

    let connection = engine
        .discover_server(name)
        .await
        .map_err(CliError::from)?;

    print_connection(name, &connection, json)?;

    if !json && connection.connection_type() == ConnectionType::Embedded {
        println!();
        println!(
            "Server log: {}",
            engine.lock_dir().join(log_file_name(name)).display()
        );
    }

    Ok(())
}
