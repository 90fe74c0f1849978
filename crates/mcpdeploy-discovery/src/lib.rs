//! Discovery and deployment of MCP servers.
//!
//! [`DiscoveryEngine`] answers "give me a working connection to service X":
//! it reuses a cached connection, finds an instance that is already running,
//! or deploys one when the host has room for it.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod cache;
pub mod deploy;
pub mod detect;
mod engine;

#[cfg(test)]
mod test_support;

#[cfg(test)]
use axum as _;

pub use deploy::{DeployError, Deployed, Deployer};
pub use detect::{Detection, Detector};
pub use engine::{DiscoveryEngine, EngineBuildError, EngineBuilder, ServiceHealth};
