//! Discovered connection value type.
//!
//! A `ServerConnection` is produced by a detection strategy or a deployment
//! strategy and never mutated afterwards. The `with_*` builders consume the
//! value and return a new one.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scheme used for connections served on demand by a package runner.
pub const NPX_SCHEME: &str = "npx";

/// Locator returned when an on-demand service is deferred to its provider.
pub const NPX_CLOUD_URL: &str = "npx://cloud";

/// Provenance of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Pre-existing remote or independently managed instance.
    External,
    /// Started by another local user process.
    User,
    /// Running inside a container.
    Docker,
    /// Started on demand by the package runner, no persistent process.
    Npx,
    /// Spawned by this engine.
    Embedded,
}

impl ConnectionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::User => "user",
            Self::Docker => "docker",
            Self::Npx => "npx",
            Self::Embedded => "embedded",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health label recorded when the connection was produced.
///
/// This is informational only. Whether a connection is usable is always
/// decided by a fresh health verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unknown,
    OnDemand,
    Running,
    Available,
    Starting,
}

impl HealthStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unknown => "unknown",
            Self::OnDemand => "on_demand",
            Self::Running => "running",
            Self::Available => "available",
            Self::Starting => "starting",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A usable (or candidate) connection to an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConnection {
    url: String,
    #[serde(rename = "type")]
    connection_type: ConnectionType,
    health_status: HealthStatus,
    #[serde(default)]
    resource_usage: BTreeMap<String, Value>,
    discovered_at: DateTime<Utc>,
}

impl ServerConnection {
    /// Create a connection discovered now.
    pub fn new(
        url: impl Into<String>,
        connection_type: ConnectionType,
        health_status: HealthStatus,
    ) -> Self {
        Self {
            url: url.into(),
            connection_type,
            health_status,
            resource_usage: BTreeMap::new(),
            discovered_at: Utc::now(),
        }
    }

    /// On-demand connection deferred to the package runner's provider.
    #[must_use]
    pub fn on_demand_cloud() -> Self {
        Self::new(NPX_CLOUD_URL, ConnectionType::Npx, HealthStatus::OnDemand)
    }

    /// Return a copy carrying an extra provenance fact.
    #[must_use]
    pub fn with_resource(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.resource_usage.insert(key.into(), value.into());
        self
    }

    /// Return a copy with a different discovery timestamp.
    #[must_use]
    pub const fn with_discovered_at(mut self, discovered_at: DateTime<Utc>) -> Self {
        self.discovered_at = discovered_at;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    pub const fn health_status(&self) -> HealthStatus {
        self.health_status
    }

    pub const fn resource_usage(&self) -> &BTreeMap<String, Value> {
        &self.resource_usage
    }

    pub const fn discovered_at(&self) -> DateTime<Utc> {
        self.discovered_at
    }

    /// Whether the URL can be probed over HTTP.
    pub fn is_http(&self) -> bool {
        is_http_url(&self.url)
    }

    /// Time elapsed since discovery, clamped at zero for clock skew.
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.discovered_at).to_std().unwrap_or_default()
    }
}

/// Whether `candidate` parses as an absolute `http`/`https` URL with a host.
pub fn is_http_url(candidate: &str) -> bool {
    url::Url::parse(candidate.trim())
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn serializes_type_and_status_as_lowercase_labels() {
        let conn = ServerConnection::on_demand_cloud().with_resource("package", "x");
        let json = serde_json::to_value(&conn).unwrap();

        assert_eq!(json["url"], "npx://cloud");
        assert_eq!(json["type"], "npx");
        assert_eq!(json["health_status"], "on_demand");
        assert_eq!(json["resource_usage"]["package"], "x");
    }

    #[test]
    fn builders_return_new_values() {
        let original = ServerConnection::new(
            "http://localhost:8000",
            ConnectionType::External,
            HealthStatus::Healthy,
        );
        let updated = original.clone().with_resource("port", 8000);

        assert!(original.resource_usage().is_empty());
        assert_eq!(updated.resource_usage()["port"], 8000);
        assert_ne!(original, updated);
    }

    #[test]
    fn age_is_measured_from_discovery() {
        let now = Utc::now();
        let conn = ServerConnection::on_demand_cloud()
            .with_discovered_at(now - Duration::seconds(90));

        assert_eq!(conn.age(now).as_secs(), 90);

        let future = ServerConnection::on_demand_cloud()
            .with_discovered_at(now + Duration::seconds(10));
        assert_eq!(future.age(now).as_secs(), 0);
    }

    #[test]
    fn http_detection() {
        assert!(is_http_url("http://localhost:8000"));
        assert!(is_http_url(" https://example.com/mcp \n"));
        assert!(!is_http_url("npx://cloud"));
        assert!(!is_http_url("not a url"));
        assert!(!is_http_url(""));
    }
}
