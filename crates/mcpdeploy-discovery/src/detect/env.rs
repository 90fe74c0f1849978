//! Strategy 6: URL published through environment variables.

use std::ffi::OsString;
use std::sync::Arc;

use async_trait::async_trait;
use mcpdeploy_core::{ConnectionType, DiscoveryConfig, HealthStatus, ServerConnection};
use tracing::debug;

use super::{Detection, Detector};

/// Trait for accessing environment variables (injectable for testing).
pub trait EnvProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<OsString>;
}

/// Reads the real process environment.
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn get(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

/// Environment with predefined variables.
#[cfg(test)]
#[derive(Default)]
pub struct MockEnv {
    vars: std::collections::HashMap<String, OsString>,
}

#[cfg(test)]
impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
impl EnvProvider for MockEnv {
    fn get(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }
}

pub struct EnvDetector {
    config: Arc<DiscoveryConfig>,
    env: Box<dyn EnvProvider>,
}

impl EnvDetector {
    pub fn new(config: Arc<DiscoveryConfig>, env: Box<dyn EnvProvider>) -> Self {
        Self { config, env }
    }
}

#[async_trait]
impl Detector for EnvDetector {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn detect(&self, service: &str) -> Detection {
        for var in self.config.env_vars(service) {
            let Some(value) = self.env.get(var) else {
                continue;
            };
            let value = value.to_string_lossy();
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            debug!(service, var = %var, url = value, "Found service URL in environment");
            return Detection::Found(
                ServerConnection::new(value, ConnectionType::External, HealthStatus::Unknown)
                    .with_resource("env_var", var.as_str()),
            );
        }

        Detection::NotFound
    }
}
