//! Discovery configuration.
//!
//! `DiscoveryConfig` is the explicit configuration handed to the engine at
//! construction. It carries every per-service table (requirements, known
//! ports, process patterns, package names, environment variable names and the
//! deployment strategy) plus the global timeouts. Nothing here is mutated
//! after the engine is built.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ServerRequirements;

/// URL assumed for a service found in the process list when its profile has
/// no `process_url`. The process itself is not introspected.
pub const DEFAULT_PROCESS_URL: &str = "http://localhost:8000";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PORT_PROBE_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_STARTUP_GRACE_MS: u64 = 3000;
pub const DEFAULT_CPU_WARN_PERCENT: f32 = 90.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How a service is brought up when no running instance is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DeploymentSpec {
    /// Spawn a local server process.
    Subprocess(SubprocessSpec),
    /// Defer to the package runner; nothing is started locally.
    OnDemand,
}

/// Launch recipe for a subprocess deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubprocessSpec {
    /// Candidate source directories, searched in order. `~` is expanded.
    pub search_paths: Vec<String>,
    /// Program to execute (resolved through PATH).
    pub program: String,
    /// Arguments. Every `{port}` is replaced by the allocated port.
    #[serde(default)]
    pub args: Vec<String>,
    /// First port of the allocation range.
    pub base_port: u16,
    /// Number of ports scanned from `base_port`.
    #[serde(default = "default_port_span")]
    pub port_span: u16,
}

const fn default_port_span() -> u16 {
    100
}

impl SubprocessSpec {
    /// Arguments with `{port}` substituted.
    pub fn render_args(&self, port: u16) -> Vec<String> {
        let port = port.to_string();
        self.args.iter().map(|a| a.replace("{port}", &port)).collect()
    }
}

/// Everything the engine knows statically about one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceProfile {
    pub requirements: Option<ServerRequirements>,
    /// Conventional ports probed by the known-ports strategy.
    pub known_ports: Vec<u16>,
    /// Process name / command-line substrings.
    pub process_patterns: Vec<String>,
    /// URL reported when a matching process is found.
    pub process_url: Option<String>,
    /// Package name for package-runner (npx) services.
    pub package: Option<String>,
    /// Environment variables that may hold the service URL.
    pub env_vars: Vec<String>,
    pub deployment: Option<DeploymentSpec>,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-service profiles keyed by service name.
    pub services: BTreeMap<String, ServiceProfile>,
    pub cache_ttl_secs: u64,
    pub lock_timeout_secs: u64,
    pub health_timeout_secs: u64,
    pub port_probe_timeout_ms: u64,
    pub startup_grace_ms: u64,
    /// CPU usage above which a deployment logs a warning.
    pub cpu_warn_percent: f32,
    /// Shared directory for deployment locks and URL markers.
    pub lock_dir: Option<PathBuf>,
    /// Directory searched for `node_modules/.bin` and `package.json`.
    pub project_root: Option<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DiscoveryConfig {
    /// Configuration with no services and default timeouts.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            services: BTreeMap::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            port_probe_timeout_ms: DEFAULT_PORT_PROBE_TIMEOUT_MS,
            startup_grace_ms: DEFAULT_STARTUP_GRACE_MS,
            cpu_warn_percent: DEFAULT_CPU_WARN_PERCENT,
            lock_dir: None,
            project_root: None,
        }
    }

    /// Configuration seeded with the built-in service profiles.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut config = Self::empty();

        config.services.insert(
            "zen-mcp".to_owned(),
            ServiceProfile {
                requirements: Some(
                    ServerRequirements::new(512, 1.0)
                        .with_ports([8000, 8001])
                        .with_dependencies(["python3"]),
                ),
                known_ports: vec![8000, 8001, 8080],
                process_patterns: strings(["zen-mcp-server", "zen_mcp", "zen-mcp"]),
                process_url: Some(DEFAULT_PROCESS_URL.to_owned()),
                package: None,
                env_vars: strings(["ZEN_MCP_URL", "ZEN_MCP_SERVER_URL"]),
                deployment: Some(DeploymentSpec::Subprocess(SubprocessSpec {
                    search_paths: strings([
                        "~/zen-mcp-server",
                        "./zen-mcp-server",
                        "../zen-mcp-server",
                        "/opt/zen-mcp-server",
                    ]),
                    program: "python3".to_owned(),
                    args: strings(["server.py", "--port", "{port}"]),
                    base_port: 8000,
                    port_span: 100,
                })),
            },
        );

        config.services.insert(
            "context7".to_owned(),
            on_demand_profile("@upstash/context7-mcp", 256, ["context7"], ["CONTEXT7_URL"]),
        );
        config.services.insert(
            "sequential-thinking".to_owned(),
            on_demand_profile(
                "@modelcontextprotocol/server-sequential-thinking",
                128,
                ["server-sequential-thinking"],
                ["SEQUENTIAL_THINKING_URL"],
            ),
        );
        config.services.insert(
            "playwright".to_owned(),
            on_demand_profile("@playwright/mcp", 1024, ["playwright-mcp"], ["PLAYWRIGHT_MCP_URL"]),
        );

        config
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache_ttl_secs must be > 0".to_owned()));
        }
        if self.lock_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "lock_timeout_secs must be > 0".to_owned(),
            ));
        }
        if self.health_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "health_timeout_secs must be > 0".to_owned(),
            ));
        }
        if !(0.0..=100.0).contains(&self.cpu_warn_percent) {
            return Err(ConfigError::Invalid(format!(
                "cpu_warn_percent must be within 0-100, got {}",
                self.cpu_warn_percent
            )));
        }

        for (name, profile) in &self.services {
            if let Some(DeploymentSpec::Subprocess(spec)) = &profile.deployment {
                if spec.program.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "service '{name}': subprocess program is empty"
                    )));
                }
                if spec.port_span == 0
                    || u32::from(spec.base_port) + u32::from(spec.port_span) > 65_536
                {
                    return Err(ConfigError::Invalid(format!(
                        "service '{name}': port range {}+{} is out of bounds",
                        spec.base_port, spec.port_span
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn service(&self, name: &str) -> Option<&ServiceProfile> {
        self.services.get(name)
    }

    pub fn requirements(&self, name: &str) -> Option<&ServerRequirements> {
        self.service(name).and_then(|p| p.requirements.as_ref())
    }

    pub fn known_ports(&self, name: &str) -> &[u16] {
        self.service(name).map_or(&[], |p| p.known_ports.as_slice())
    }

    pub fn process_patterns(&self, name: &str) -> &[String] {
        self.service(name).map_or(&[], |p| p.process_patterns.as_slice())
    }

    /// URL for a process-list hit, falling back to [`DEFAULT_PROCESS_URL`].
    pub fn process_url(&self, name: &str) -> &str {
        self.service(name)
            .and_then(|p| p.process_url.as_deref())
            .unwrap_or(DEFAULT_PROCESS_URL)
    }

    pub fn package(&self, name: &str) -> Option<&str> {
        self.service(name).and_then(|p| p.package.as_deref())
    }

    pub fn env_vars(&self, name: &str) -> &[String] {
        self.service(name).map_or(&[], |p| p.env_vars.as_slice())
    }

    pub fn deployment(&self, name: &str) -> Option<&DeploymentSpec> {
        self.service(name).and_then(|p| p.deployment.as_ref())
    }

    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    pub const fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub const fn port_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.port_probe_timeout_ms)
    }

    pub const fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    /// Shared lock directory after applying the environment override.
    pub fn effective_lock_dir(&self) -> PathBuf {
        crate::paths::resolve_lock_dir(self.lock_dir.as_deref())
    }

    /// Project root for package-manager artifacts (defaults to the cwd).
    pub fn effective_project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn on_demand_profile<const P: usize, const E: usize>(
    package: &str,
    memory_mb: u64,
    patterns: [&str; P],
    env_vars: [&str; E],
) -> ServiceProfile {
    ServiceProfile {
        requirements: Some(ServerRequirements::new(memory_mb, 0.25).with_dependencies(["npx"])),
        known_ports: Vec::new(),
        process_patterns: strings(patterns),
        process_url: None,
        package: Some(package.to_owned()),
        env_vars: strings(env_vars),
        deployment: Some(DeploymentSpec::OnDemand),
    }
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
