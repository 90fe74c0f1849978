//! Construction of a [`DiscoveryEngine`].
//!
//! Every collaborator defaults to the real OS adapter; tests swap in fakes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use mcpdeploy_core::{ConfigError, DiscoveryConfig, HealthVerifier, ResourceProbe};
use mcpdeploy_runtime::{HealthClientError, HttpHealthVerifier, SystemResourceMonitor};
use thiserror::Error;

use super::DiscoveryEngine;
use crate::cache::DeploymentCache;
use crate::deploy::{DeployContext, Deployer, deployers_from_config};
use crate::detect::{Detector, default_detectors};

#[derive(Debug, Error)]
pub enum EngineBuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build health check client: {0}")]
    HealthClient(#[source] HealthClientError),
}

pub struct EngineBuilder {
    config: DiscoveryConfig,
    probe: Option<Arc<dyn ResourceProbe>>,
    health: Option<Arc<dyn HealthVerifier>>,
    detectors: Option<Vec<Box<dyn Detector>>>,
    deployers: HashMap<String, Arc<dyn Deployer>>,
    lock_dir: Option<PathBuf>,
}

impl EngineBuilder {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            probe: None,
            health: None,
            detectors: None,
            deployers: HashMap::new(),
            lock_dir: None,
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ResourceProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn with_health(mut self, health: Arc<dyn HealthVerifier>) -> Self {
        self.health = Some(health);
        self
    }

    /// Replace the six default detection strategies.
    #[must_use]
    pub fn with_detectors(mut self, detectors: Vec<Box<dyn Detector>>) -> Self {
        self.detectors = Some(detectors);
        self
    }

    /// Register (or override) the deployer for one service.
    #[must_use]
    pub fn with_deployer(mut self, service: impl Into<String>, deployer: Arc<dyn Deployer>) -> Self {
        self.deployers.insert(service.into(), deployer);
        self
    }

    /// Use `dir` for locks and markers, ignoring the environment override.
    #[must_use]
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<DiscoveryEngine, EngineBuildError> {
        self.config.validate()?;
        let config = Arc::new(self.config);
        let lock_dir = self
            .lock_dir
            .unwrap_or_else(|| config.effective_lock_dir());

        let probe: Arc<dyn ResourceProbe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(SystemResourceMonitor::new(config.port_probe_timeout())),
        };
        let health: Arc<dyn HealthVerifier> = match self.health {
            Some(health) => health,
            None => Arc::new(
                HttpHealthVerifier::new(config.health_timeout())
                    .map_err(EngineBuildError::HealthClient)?,
            ),
        };

        let detectors = self
            .detectors
            .unwrap_or_else(|| default_detectors(&config, &probe, &health, lock_dir.clone()));

        let mut deployers = deployers_from_config(&DeployContext {
            config: Arc::clone(&config),
            probe: Arc::clone(&probe),
            health: Arc::clone(&health),
            lock_dir: lock_dir.clone(),
        });
        deployers.extend(self.deployers);

        Ok(DiscoveryEngine {
            cache: DeploymentCache::new(config.cache_ttl()),
            config,
            probe,
            health,
            detectors,
            deployers,
            spawned: tokio::sync::Mutex::new(HashMap::new()),
            lock_dir,
        })
    }
}
