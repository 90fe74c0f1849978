//! Command-line front end for MCP server discovery and deployment.
//!
//! `mcpdeploy discover <service>` prints a usable connection, deploying a
//! local server or deferring to the package runner when nothing healthy is
//! running. `check`, `resources` and `services` are read-only diagnostics.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// The async runtime is only entered from main.rs.
use tokio as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
