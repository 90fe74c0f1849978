//! Existing-deployment detection strategies.
//!
//! Each strategy looks for an already-running instance of a service through
//! one channel and reports a tri-state [`Detection`]. Strategies never fail
//! the discovery: the engine folds [`Detection::Failed`] into "not found".
//!
//! Order matters and is fixed by [`default_detectors`]:
//! 1. known ports
//! 2. process list
//! 3. container runtime
//! 4. package-manager artifacts
//! 5. lock files
//! 6. environment variables

mod container;
mod env;
mod known_ports;
mod lockfile;
mod package;
mod process;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use mcpdeploy_core::{DiscoveryConfig, HealthVerifier, ResourceProbe, ServerConnection};

pub use container::{ContainerDetector, ContainerSummary, first_published_port};
pub use env::{EnvDetector, EnvProvider, SystemEnv};
pub use known_ports::KnownPortsDetector;
pub use lockfile::LockFileDetector;
pub use package::{PackageDetector, binary_name_candidates};
pub use process::ProcessDetector;

#[cfg(test)]
pub use env::MockEnv;

/// Outcome of one detection strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Found(ServerConnection),
    NotFound,
    /// The channel could not be inspected (missing tool, unreadable file).
    Failed(String),
}

impl Detection {
    /// Collapse to an optional candidate, dropping the failure reason.
    pub fn into_found(self) -> Option<ServerConnection> {
        match self {
            Self::Found(connection) => Some(connection),
            Self::NotFound | Self::Failed(_) => None,
        }
    }
}

/// One way of finding a running server.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    async fn detect(&self, service: &str) -> Detection;
}

/// The six strategies in lookup order.
pub fn default_detectors(
    config: &Arc<DiscoveryConfig>,
    probe: &Arc<dyn ResourceProbe>,
    health: &Arc<dyn HealthVerifier>,
    lock_dir: PathBuf,
) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(KnownPortsDetector::new(
            Arc::clone(config),
            Arc::clone(probe),
            Arc::clone(health),
        )),
        Box::new(ProcessDetector::new(Arc::clone(config), Arc::clone(probe))),
        Box::new(ContainerDetector::new()),
        Box::new(PackageDetector::new(
            Arc::clone(config),
            config.effective_project_root(),
        )),
        Box::new(LockFileDetector::new(lock_dir)),
        Box::new(EnvDetector::new(Arc::clone(config), Box::new(SystemEnv))),
    ]
}
