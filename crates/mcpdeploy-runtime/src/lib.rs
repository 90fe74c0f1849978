//! OS-facing adapters for MCP server discovery.
//!
//! Implements the core port traits against the real host (`sysinfo`, TCP,
//! HTTP) and provides the file-level coordination primitives used during
//! deployment: the advisory deployment lock, URL marker files, and process
//! spawn/shutdown.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod health;
pub mod lockfile;
mod monitor;
mod ports;
pub mod process;

pub use health::{HealthClientError, HttpHealthVerifier};
pub use lockfile::{DeploymentLock, LockError};
pub use monitor::{DEFAULT_PORT_PROBE_TIMEOUT, SystemResourceMonitor};
pub use ports::find_available_port;
