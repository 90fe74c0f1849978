//! Static per-service resource contract.

use serde::{Deserialize, Serialize};

/// Resources a service needs before it may be deployed locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerRequirements {
    /// Memory in megabytes.
    pub memory_mb: u64,
    /// Fractional CPU cores.
    pub cpu_cores: f32,
    /// Well-known ports the service binds. Empty for on-demand services.
    pub ports: Vec<u16>,
    /// External tools that must be on PATH (runtime, package manager, ...).
    pub dependencies: Vec<String>,
}

impl ServerRequirements {
    pub fn new(memory_mb: u64, cpu_cores: f32) -> Self {
        Self {
            memory_mb,
            cpu_cores,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports = ports.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_dependencies<S: Into<String>>(mut self, deps: impl IntoIterator<Item = S>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `available_mb` of free memory satisfies this contract.
    pub const fn fits_memory(&self, available_mb: u64) -> bool {
        available_mb >= self.memory_mb
    }
}
