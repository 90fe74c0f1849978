//! Strategy 1: probe the service's conventional ports.

use std::sync::Arc;

use async_trait::async_trait;
use mcpdeploy_core::{
    ConnectionType, DiscoveryConfig, HealthStatus, HealthVerifier, ResourceProbe, ServerConnection,
};
use tracing::debug;

use super::{Detection, Detector};

/// Finds a server answering `/health` on one of its known ports.
pub struct KnownPortsDetector {
    config: Arc<DiscoveryConfig>,
    probe: Arc<dyn ResourceProbe>,
    health: Arc<dyn HealthVerifier>,
}

impl KnownPortsDetector {
    pub fn new(
        config: Arc<DiscoveryConfig>,
        probe: Arc<dyn ResourceProbe>,
        health: Arc<dyn HealthVerifier>,
    ) -> Self {
        Self {
            config,
            probe,
            health,
        }
    }
}

#[async_trait]
impl Detector for KnownPortsDetector {
    fn name(&self) -> &'static str {
        "known_ports"
    }

    async fn detect(&self, service: &str) -> Detection {
        for &port in self.config.known_ports(service) {
            // Nothing is listening on a free port.
            if self.probe.is_port_available(port).await {
                continue;
            }

            let url = format!("http://localhost:{port}");
            if self.health.check(&url).await {
                debug!(service, port, "Found healthy server on known port");
                return Detection::Found(
                    ServerConnection::new(url, ConnectionType::External, HealthStatus::Healthy)
                        .with_resource("port", port),
                );
            }
            debug!(service, port, "Known port occupied but not healthy");
        }

        Detection::NotFound
    }
}
