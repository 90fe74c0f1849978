//! Check command handler.

use anyhow::Result;
use mcpdeploy_discovery::DiscoveryEngine;

use super::print_connection;
use crate::error::CliError;

/// Run detection only. Nothing is deployed and no lock is taken.
pub async fn execute(engine: &DiscoveryEngine, name: &str, json: bool) -> Result<()> {
    match engine.find_existing_deployment(name).await {
        Some(connection) => print_connection(name, &connection, json),
        None => Err(CliError::NotFound(name.to_owned()).into()),
    }
}
