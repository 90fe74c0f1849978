//! Hand-written fakes for the engine's seams.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mcpdeploy_core::{HealthVerifier, ResourceProbe, ServerConnection};

use crate::deploy::{DeployError, Deployed, Deployer};
use crate::detect::{Detection, Detector};

/// Probe with scripted host state. Every port is free unless marked.
#[derive(Debug)]
pub struct FakeProbe {
    memory_mb: u64,
    cpu: f32,
    occupied: HashSet<u16>,
    processes: Vec<String>,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            memory_mb: 16 * 1024,
            cpu: 5.0,
            occupied: HashSet::new(),
            processes: Vec::new(),
        }
    }
}

impl FakeProbe {
    pub fn with_memory(mut self, memory_mb: u64) -> Self {
        self.memory_mb = memory_mb;
        self
    }

    pub fn with_cpu(mut self, cpu: f32) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn with_occupied(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.occupied.extend(ports);
        self
    }

    pub fn with_process(mut self, pattern: &str) -> Self {
        self.processes.push(pattern.to_owned());
        self
    }
}

#[async_trait]
impl ResourceProbe for FakeProbe {
    async fn available_memory_mb(&self) -> u64 {
        self.memory_mb
    }

    async fn cpu_usage(&self) -> f32 {
        self.cpu
    }

    async fn is_port_available(&self, port: u16) -> bool {
        !self.occupied.contains(&port)
    }

    async fn process_exists(&self, pattern: &str) -> bool {
        self.processes.iter().any(|p| p == pattern)
    }
}

/// Health verifier with a fixed set of healthy base URLs that records
/// every URL it was asked about.
#[derive(Debug, Default)]
pub struct FakeHealth {
    healthy: Mutex<HashSet<String>>,
    checked: Mutex<Vec<String>>,
}

impl FakeHealth {
    pub fn with_healthy(self, url: &str) -> Self {
        self.set_healthy(url, true);
        self
    }

    pub fn set_healthy(&self, url: &str, healthy: bool) {
        let mut set = self.healthy.lock().unwrap();
        if healthy {
            set.insert(url.to_owned());
        } else {
            set.remove(url);
        }
    }

    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl HealthVerifier for FakeHealth {
    async fn check(&self, base_url: &str) -> bool {
        self.checked.lock().unwrap().push(base_url.to_owned());
        self.healthy.lock().unwrap().contains(base_url)
    }
}

/// Detector returning a fixed outcome and counting invocations.
pub struct ScriptedDetector {
    name: &'static str,
    outcome: Detection,
    calls: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    pub fn new(name: &'static str, outcome: Detection) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                outcome,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn detect(&self, _service: &str) -> Detection {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Deployer yielding a fixed connection after an optional delay.
pub struct CountingDeployer {
    connection: ServerConnection,
    delay: Duration,
    deployments: Arc<AtomicUsize>,
}

impl CountingDeployer {
    pub fn new(connection: ServerConnection) -> (Self, Arc<AtomicUsize>) {
        let deployments = Arc::new(AtomicUsize::new(0));
        (
            Self {
                connection,
                delay: Duration::ZERO,
                deployments: Arc::clone(&deployments),
            },
            deployments,
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Deployer for CountingDeployer {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn deploy(&self, _service: &str) -> Result<Deployed, DeployError> {
        self.deployments.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Deployed::without_process(self.connection.clone()))
    }
}
