//! On-demand deployment: nothing runs locally.

use async_trait::async_trait;
use mcpdeploy_core::ServerConnection;
use tracing::info;

use super::{DeployError, Deployed, Deployer};

/// Defers the service to the package runner, which starts it per session.
pub struct OnDemandDeployer {
    package: Option<String>,
}

impl OnDemandDeployer {
    pub const fn new(package: Option<String>) -> Self {
        Self { package }
    }

    /// Connection describing an on-demand deployment of `package`.
    pub fn connection(package: Option<&str>) -> ServerConnection {
        let connection = ServerConnection::on_demand_cloud();
        match package {
            Some(package) => connection.with_resource("package", package),
            None => connection,
        }
    }
}

#[async_trait]
impl Deployer for OnDemandDeployer {
    fn name(&self) -> &'static str {
        "on_demand"
    }

    async fn deploy(&self, service: &str) -> Result<Deployed, DeployError> {
        info!(service, package = ?self.package, "Using on-demand deployment");
        Ok(Deployed::without_process(Self::connection(
            self.package.as_deref(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdeploy_core::{ConnectionType, HealthStatus};

    #[tokio::test]
    async fn yields_cloud_connection_with_package() {
        let deployer = OnDemandDeployer::new(Some("@upstash/context7-mcp".to_owned()));
        let deployed = deployer.deploy("context7").await.unwrap();

        assert!(deployed.child.is_none());
        let connection = deployed.connection;
        assert_eq!(connection.url(), "npx://cloud");
        assert_eq!(connection.connection_type(), ConnectionType::Npx);
        assert_eq!(connection.health_status(), HealthStatus::OnDemand);
        assert_eq!(connection.resource_usage()["package"], "@upstash/context7-mcp");
    }
}
