//! Subprocess deployment: start the server from a local checkout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mcpdeploy_core::paths::{expand_home, log_file_name};
use mcpdeploy_core::{
    ConnectionType, HealthStatus, HealthVerifier, ResourceProbe, ServerConnection, SubprocessSpec,
};
use mcpdeploy_runtime::find_available_port;
use mcpdeploy_runtime::lockfile::write_url_marker;
use mcpdeploy_runtime::process::{LaunchPlan, shutdown_child, spawn_server};
use tracing::{debug, info, warn};

use super::{DeployError, Deployed, Deployer};

pub struct SubprocessDeployer {
    spec: SubprocessSpec,
    dependencies: Vec<String>,
    probe: Arc<dyn ResourceProbe>,
    health: Arc<dyn HealthVerifier>,
    lock_dir: PathBuf,
    startup_grace: Duration,
}

impl SubprocessDeployer {
    pub fn new(
        spec: SubprocessSpec,
        dependencies: Vec<String>,
        probe: Arc<dyn ResourceProbe>,
        health: Arc<dyn HealthVerifier>,
        lock_dir: PathBuf,
        startup_grace: Duration,
    ) -> Self {
        Self {
            spec,
            dependencies,
            probe,
            health,
            lock_dir,
            startup_grace,
        }
    }

    fn check_dependencies(&self) -> Result<(), DeployError> {
        for dependency in &self.dependencies {
            which::which(dependency)
                .map_err(|_| DeployError::MissingDependency(dependency.clone()))?;
        }
        Ok(())
    }

    /// First configured search path that exists as a directory.
    fn find_installation(&self) -> Option<PathBuf> {
        self.spec.search_paths.iter().find_map(|candidate| {
            match expand_home(candidate) {
                Ok(path) if path.is_dir() => Some(path),
                Ok(_) => None,
                Err(e) => {
                    debug!(path = %candidate, error = %e, "Skipping search path");
                    None
                }
            }
        })
    }
}

#[async_trait]
impl Deployer for SubprocessDeployer {
    fn name(&self) -> &'static str {
        "subprocess"
    }

    async fn deploy(&self, service: &str) -> Result<Deployed, DeployError> {
        self.check_dependencies()?;

        let install_dir = self
            .find_installation()
            .ok_or_else(|| DeployError::NoInstallation {
                searched: self.spec.search_paths.clone(),
            })?;

        let port = find_available_port(self.probe.as_ref(), self.spec.base_port, self.spec.port_span)
            .await
            .ok_or(DeployError::NoFreePort {
                base: self.spec.base_port,
                span: self.spec.port_span,
            })?;

        let plan = LaunchPlan {
            program: self.spec.program.clone(),
            args: self.spec.render_args(port),
            working_dir: install_dir.clone(),
            log_path: self.lock_dir.join(log_file_name(service)),
        };
        info!(service, port, path = %install_dir.display(), "Starting server process");
        let child = spawn_server(&plan).map_err(DeployError::Spawn)?;
        let pid = child.id();

        tokio::time::sleep(self.startup_grace).await;

        let url = format!("http://localhost:{port}");
        if !self.health.check(&url).await {
            warn!(service, url = %url, pid, log = %plan.log_path.display(), "Server failed health check, stopping it");
            if let Err(e) = shutdown_child(child).await {
                warn!(service, pid, error = %e, "Failed to stop unhealthy server");
            }
            return Err(DeployError::Unhealthy {
                url,
                waited: self.startup_grace,
            });
        }

        if let Err(e) = write_url_marker(&self.lock_dir, service, &url) {
            warn!(service, error = %e, "Failed to write URL marker");
        }

        info!(service, url = %url, pid, "Server is ready");
        let mut connection =
            ServerConnection::new(url, ConnectionType::Embedded, HealthStatus::Healthy)
                .with_resource("port", port)
                .with_resource("path", install_dir.display().to_string());
        if let Some(pid) = pid {
            connection = connection.with_resource("pid", pid);
        }

        Ok(Deployed {
            connection,
            child: Some(child),
        })
    }
}
