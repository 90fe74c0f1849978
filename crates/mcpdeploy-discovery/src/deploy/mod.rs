//! Deployment strategies.
//!
//! A [`Deployer`] brings a service up when detection found nothing. The
//! engine resolves one deployer per service at construction from the
//! `deployment` entry of each service profile.

mod on_demand;
mod subprocess;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mcpdeploy_core::{
    DeploymentSpec, DiscoveryConfig, HealthVerifier, ResourceProbe, ServerConnection,
};
use thiserror::Error;
use tokio::process::Child;

pub use on_demand::OnDemandDeployer;
pub use subprocess::SubprocessDeployer;

/// Why a deployment attempt failed.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Required executable '{0}' not found on PATH")]
    MissingDependency(String),

    #[error("No installation found in any of: {}", .searched.join(", "))]
    NoInstallation { searched: Vec<String> },

    #[error("No available port among {span} ports starting at {base}")]
    NoFreePort { base: u16, span: u16 },

    #[error("Failed to spawn server: {0}")]
    Spawn(#[source] io::Error),

    #[error("Server at {url} did not become healthy within {waited:?}")]
    Unhealthy { url: String, waited: Duration },
}

/// Result of a successful deployment.
#[derive(Debug)]
pub struct Deployed {
    pub connection: ServerConnection,
    /// Handle of a process started by the deployer, if any.
    pub child: Option<Child>,
}

impl Deployed {
    pub const fn without_process(connection: ServerConnection) -> Self {
        Self {
            connection,
            child: None,
        }
    }
}

#[async_trait]
pub trait Deployer: Send + Sync {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    async fn deploy(&self, service: &str) -> Result<Deployed, DeployError>;
}

/// Shared collaborators for building deployers.
pub struct DeployContext {
    pub config: Arc<DiscoveryConfig>,
    pub probe: Arc<dyn ResourceProbe>,
    pub health: Arc<dyn HealthVerifier>,
    pub lock_dir: PathBuf,
}

/// Build the service name → deployer table from the configuration.
pub fn deployers_from_config(ctx: &DeployContext) -> HashMap<String, Arc<dyn Deployer>> {
    ctx.config
        .services
        .iter()
        .filter_map(|(name, profile)| {
            let deployer: Arc<dyn Deployer> = match profile.deployment.as_ref()? {
                DeploymentSpec::Subprocess(spec) => Arc::new(SubprocessDeployer::new(
                    spec.clone(),
                    profile
                        .requirements
                        .as_ref()
                        .map(|r| r.dependencies.clone())
                        .unwrap_or_default(),
                    Arc::clone(&ctx.probe),
                    Arc::clone(&ctx.health),
                    ctx.lock_dir.clone(),
                    ctx.config.startup_grace(),
                )),
                DeploymentSpec::OnDemand => {
                    Arc::new(OnDemandDeployer::new(profile.package.clone()))
                }
            };
            Some((name.clone(), deployer))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHealth, FakeProbe};

    #[test]
    fn table_follows_profiles() {
        let ctx = DeployContext {
            config: Arc::new(DiscoveryConfig::with_defaults()),
            probe: Arc::new(FakeProbe::default()),
            health: Arc::new(FakeHealth::default()),
            lock_dir: std::env::temp_dir(),
        };

        let table = deployers_from_config(&ctx);

        assert_eq!(table["zen-mcp"].name(), "subprocess");
        assert_eq!(table["context7"].name(), "on_demand");
        assert_eq!(table["playwright"].name(), "on_demand");
        assert!(!table.contains_key("unknown"));
    }

    #[test]
    fn errors_describe_the_failure() {
        let err = DeployError::NoFreePort {
            base: 8000,
            span: 100,
        };
        assert_eq!(
            err.to_string(),
            "No available port among 100 ports starting at 8000"
        );

        let err = DeployError::NoInstallation {
            searched: vec!["~/a".to_owned(), "/opt/a".to_owned()],
        };
        assert!(err.to_string().contains("~/a, /opt/a"));
    }
}
