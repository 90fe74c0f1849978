//! Command handlers.
//!
//! Handlers are thin: they call the engine or the resource monitor and
//! format the result for the terminal. Failures are returned as
//! [`CliError`](crate::error::CliError) wrapped in `anyhow` so `main` can
//! pick the exit code.

pub mod check;
pub mod discover;
pub mod resources;
pub mod services;

use anyhow::Result;
use mcpdeploy_core::ServerConnection;

use crate::presentation::{connection_json, connection_lines};

/// Print a connection as text or JSON.
fn print_connection(service: &str, connection: &ServerConnection, json: bool) -> Result<()> {
    if json {
        println!("{}", connection_json(service, connection)?);
    } else {
        for line in connection_lines(service, connection) {
            println!("{line}");
        }
    }
    Ok(())
}
