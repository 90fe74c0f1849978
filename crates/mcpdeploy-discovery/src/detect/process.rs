//! Strategy 2: look for a matching process.
//!
//! The process is not introspected for its listening address. A hit is
//! reported at the per-service process URL from the configuration, which
//! falls back to `http://localhost:8000`.

use std::sync::Arc;

use async_trait::async_trait;
use mcpdeploy_core::{ConnectionType, DiscoveryConfig, HealthStatus, ResourceProbe, ServerConnection};
use tracing::debug;

use super::{Detection, Detector};

pub struct ProcessDetector {
    config: Arc<DiscoveryConfig>,
    probe: Arc<dyn ResourceProbe>,
}

impl ProcessDetector {
    pub fn new(config: Arc<DiscoveryConfig>, probe: Arc<dyn ResourceProbe>) -> Self {
        Self { config, probe }
    }
}

#[async_trait]
impl Detector for ProcessDetector {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn detect(&self, service: &str) -> Detection {
        for pattern in self.config.process_patterns(service) {
            if self.probe.process_exists(pattern).await {
                let url = self.config.process_url(service);
                debug!(service, pattern = %pattern, url, "Found matching process");
                return Detection::Found(
                    ServerConnection::new(url, ConnectionType::User, HealthStatus::Running)
                        .with_resource("process_pattern", pattern.as_str()),
                );
            }
        }

        Detection::NotFound
    }
}
