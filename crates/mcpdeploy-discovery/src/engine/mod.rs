//! Discovery orchestrator.
//!
//! `discover_server` runs four phases in order and stops at the first one
//! that yields a connection:
//!
//! 1. cache: a fresh entry that still passes health verification
//! 2. detection: the six strategies, first healthy candidate wins
//! 3. resources: memory check, with an on-demand fallback for package
//!    services when the host is short
//! 4. deployment: under the per-service cross-process lock, re-check the
//!    cache and detection, then run the service's deployer
//!
//! Every successful phase writes the cache.

mod builder;
mod report;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use mcpdeploy_core::{
    ConnectionType, DiscoveryConfig, DiscoveryError, HealthVerifier, ResourceProbe,
    ServerConnection,
};
use mcpdeploy_runtime::lockfile::delete_url_marker;
use mcpdeploy_runtime::process::shutdown_child;
use mcpdeploy_runtime::{DeploymentLock, LockError};
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::DeploymentCache;
use crate::deploy::{Deployed, Deployer, OnDemandDeployer};
use crate::detect::{Detection, Detector};

pub use builder::{EngineBuildError, EngineBuilder};
pub use report::ServiceHealth;

pub struct DiscoveryEngine {
    config: Arc<DiscoveryConfig>,
    probe: Arc<dyn ResourceProbe>,
    health: Arc<dyn HealthVerifier>,
    detectors: Vec<Box<dyn Detector>>,
    deployers: HashMap<String, Arc<dyn Deployer>>,
    cache: DeploymentCache,
    /// Servers started by this engine, kept for `teardown`.
    spawned: Mutex<HashMap<String, Child>>,
    lock_dir: PathBuf,
}

impl DiscoveryEngine {
    /// Engine wired to the real host.
    pub fn new(config: DiscoveryConfig) -> Result<Self, EngineBuildError> {
        Self::builder(config).build()
    }

    pub fn builder(config: DiscoveryConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Find or start `service` and return a usable connection.
    pub async fn discover_server(&self, service: &str) -> Result<ServerConnection, DiscoveryError> {
        if let Some(connection) = self.cached_healthy(service).await {
            debug!(service, url = %connection.url(), "Using cached connection");
            return Ok(connection);
        }

        if let Some(connection) = self.find_existing_deployment(service).await {
            self.cache.insert(service, connection.clone());
            return Ok(connection);
        }

        let deployer = self
            .deployers
            .get(service)
            .cloned()
            .ok_or_else(|| DiscoveryError::NoStrategy(service.to_owned()))?;

        if let Some(fallback) = self.check_resources(service).await? {
            self.cache.insert(service, fallback.clone());
            return Ok(fallback);
        }

        self.deploy_locked(service, deployer.as_ref()).await
    }

    /// Fresh cached connection for `service`, without health checks or eviction.
    pub fn get_cached_connection(&self, service: &str) -> Option<ServerConnection> {
        self.cache.get_fresh(service, Utc::now())
    }

    /// Whether `connection` is usable right now.
    ///
    /// `npx` connections are started per session and always count as healthy.
    /// HTTP connections must answer `GET /health` with 200. Anything else is
    /// unhealthy.
    pub async fn verify_health(&self, connection: &ServerConnection) -> bool {
        if connection.connection_type() == ConnectionType::Npx {
            return true;
        }
        if connection.is_http() {
            return self.health.check(connection.url()).await;
        }
        debug!(url = %connection.url(), "Connection has no checkable URL");
        false
    }

    /// Run the detection strategies in order and return the first healthy
    /// candidate. Strategy failures count as "not found".
    pub async fn find_existing_deployment(&self, service: &str) -> Option<ServerConnection> {
        for detector in &self.detectors {
            let strategy = detector.name();
            match detector.detect(service).await {
                Detection::Found(candidate) => {
                    if self.verify_health(&candidate).await {
                        info!(service, strategy, url = %candidate.url(), "Found existing deployment");
                        return Some(candidate);
                    }
                    debug!(service, strategy, url = %candidate.url(), "Candidate failed health check");
                }
                Detection::NotFound => {
                    debug!(service, strategy, "Nothing found");
                }
                Detection::Failed(reason) => {
                    debug!(service, strategy, reason = %reason, "Detection strategy failed");
                }
            }
        }
        None
    }

    /// Evict `service` and stop its server if this engine started it.
    ///
    /// Returns whether anything was torn down.
    pub async fn teardown(&self, service: &str) -> Result<bool, DiscoveryError> {
        let evicted = self.cache.remove(service).is_some();
        let child = self.spawned.lock().await.remove(service);

        let Some(child) = child else {
            return Ok(evicted);
        };

        let pid = child.id();
        shutdown_child(child).await.map_err(|e| {
            DiscoveryError::deployment(service, format!("failed to stop server: {e}"))
        })?;
        info!(service, pid, "Stopped spawned server");

        if let Err(e) = delete_url_marker(&self.lock_dir, service) {
            warn!(service, error = %e, "Failed to delete URL marker");
        }
        Ok(true)
    }

    async fn cached_healthy(&self, service: &str) -> Option<ServerConnection> {
        let cached = self.cache.get(service)?;

        if cached.age(Utc::now()) >= self.cache.ttl() {
            debug!(service, "Cached connection expired");
            self.cache.evict(service, &cached);
            return None;
        }
        if self.verify_health(&cached).await {
            return Some(cached);
        }

        debug!(service, url = %cached.url(), "Cached connection is unhealthy");
        self.cache.evict(service, &cached);
        None
    }

    /// Memory gate before deploying locally.
    ///
    /// Returns an on-demand connection when memory is short and the service
    /// can run through the package runner instead.
    async fn check_resources(
        &self,
        service: &str,
    ) -> Result<Option<ServerConnection>, DiscoveryError> {
        let required_mb = self.config.requirements(service).map_or(0, |r| r.memory_mb);
        let available_mb = self.probe.available_memory_mb().await;

        let cpu = self.probe.cpu_usage().await;
        if cpu > self.config.cpu_warn_percent {
            warn!(service, cpu, threshold = self.config.cpu_warn_percent, "High CPU usage");
        } else {
            debug!(service, cpu, "CPU usage");
        }

        if available_mb >= required_mb {
            debug!(service, required_mb, available_mb, "Resources sufficient");
            return Ok(None);
        }

        if let Some(package) = self.config.package(service) {
            warn!(
                service,
                required_mb, available_mb, "Insufficient memory, falling back to on-demand"
            );
            return Ok(Some(OnDemandDeployer::connection(Some(package))));
        }

        Err(DiscoveryError::InsufficientResources {
            service: service.to_owned(),
            required_mb,
            available_mb,
        })
    }

    async fn deploy_locked(
        &self,
        service: &str,
        deployer: &dyn Deployer,
    ) -> Result<ServerConnection, DiscoveryError> {
        let _lock = DeploymentLock::acquire(&self.lock_dir, service, self.config.lock_timeout())
            .await
            .map_err(|e| match e {
                LockError::Timeout { timeout, .. } => DiscoveryError::LockTimeout {
                    service: service.to_owned(),
                    timeout,
                },
                LockError::Io { source, .. } => DiscoveryError::Lock {
                    service: service.to_owned(),
                    source,
                },
            })?;
        info!(service, "Acquired deployment lock");

        // Another caller may have finished while we waited.
        if let Some(connection) = self.cached_healthy(service).await {
            return Ok(connection);
        }
        if let Some(connection) = self.find_existing_deployment(service).await {
            self.cache.insert(service, connection.clone());
            return Ok(connection);
        }

        info!(service, strategy = deployer.name(), "Deploying server");
        let Deployed { connection, child } = deployer
            .deploy(service)
            .await
            .map_err(|e| DiscoveryError::deployment(service, e.to_string()))?;

        self.cache.insert(service, connection.clone());
        if let Some(child) = child {
            let replaced = self.spawned.lock().await.insert(service.to_owned(), child);
            if let Some(old) = replaced {
                if let Err(e) = shutdown_child(old).await {
                    warn!(service, error = %e, "Failed to stop replaced server");
                }
            }
        }

        Ok(connection)
    }
}
