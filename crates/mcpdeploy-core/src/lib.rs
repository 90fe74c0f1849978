//! Core domain for resource-aware MCP server discovery.
//!
//! Pure types only: connection and requirement values, the explicit
//! configuration struct, the error taxonomy and the port traits the
//! runtime adapters implement. No sockets, processes or files are touched
//! here except when loading a configuration file.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;

pub use config::{ConfigError, DeploymentSpec, DiscoveryConfig, ServiceProfile, SubprocessSpec};
pub use domain::{ConnectionType, HealthStatus, ServerConnection, ServerRequirements};
pub use error::DiscoveryError;
pub use paths::PathError;
pub use ports::{HealthVerifier, ResourceProbe};
