//! Strategy 3: running containers.
//!
//! Uses the `docker` CLI when it is on PATH. One JSON object per line is
//! requested from `docker ps` so the output is stable across versions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use mcpdeploy_core::{ConnectionType, HealthStatus, ServerConnection};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use super::{Detection, Detector};

const LIST_TIMEOUT: Duration = Duration::from_secs(5);

/// One row of `docker ps --format '{{json .}}'`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContainerSummary {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "Names")]
    pub names: String,
    #[serde(rename = "Ports")]
    pub ports: String,
}

impl ContainerSummary {
    fn matches(&self, service: &str) -> bool {
        let service = service.to_lowercase();
        self.names.to_lowercase().contains(&service) || self.image.to_lowercase().contains(&service)
    }
}

/// First published host port in a `Ports` column such as
/// `0.0.0.0:8080->8080/tcp, :::8080->8080/tcp`.
pub fn first_published_port(ports: &str) -> Option<u16> {
    ports.split(',').find_map(|mapping| {
        let (host, _container) = mapping.trim().split_once("->")?;
        host.rsplit(':').next()?.parse().ok()
    })
}

#[derive(Debug, Default)]
pub struct ContainerDetector {
    client: Option<PathBuf>,
}

impl ContainerDetector {
    /// Detector using the `docker` binary found on PATH, if any.
    pub fn new() -> Self {
        Self {
            client: which::which("docker").ok(),
        }
    }

    /// Detector using an explicit client binary.
    pub const fn with_client(client: PathBuf) -> Self {
        Self {
            client: Some(client),
        }
    }
}

async fn list_containers(client: &Path) -> Result<Vec<ContainerSummary>, String> {
    let output = tokio::time::timeout(
        LIST_TIMEOUT,
        Command::new(client)
            .args(["ps", "--format", "{{json .}}"])
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| format!("docker ps timed out after {LIST_TIMEOUT:?}"))?
    .map_err(|e| format!("failed to run docker ps: {e}"))?;

    if !output.status.success() {
        return Err(format!(
            "docker ps exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(parse_container_list(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_container_list(stdout: &str) -> Vec<ContainerSummary> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!(error = %e, "Skipping unparseable docker ps row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Detector for ContainerDetector {
    fn name(&self) -> &'static str {
        "container"
    }

    async fn detect(&self, service: &str) -> Detection {
        let Some(client) = &self.client else {
            return Detection::Failed("docker client not found on PATH".to_owned());
        };

        let containers = match list_containers(client).await {
            Ok(containers) => containers,
            Err(reason) => return Detection::Failed(reason),
        };

        for container in containers.iter().filter(|c| c.matches(service)) {
            let Some(port) = first_published_port(&container.ports) else {
                debug!(service, container = %container.names, "Matching container has no published port");
                continue;
            };

            debug!(service, container = %container.names, port, "Found matching container");
            return Detection::Found(
                ServerConnection::new(
                    format!("http://localhost:{port}"),
                    ConnectionType::Docker,
                    HealthStatus::Running,
                )
                .with_resource("container_id", container.id.as_str())
                .with_resource("image", container.image.as_str())
                .with_resource("port", port),
            );
        }

        Detection::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_OUTPUT: &str = r#"{"Command":"\"python\"","ID":"a1b2c3","Image":"postgres:16","Names":"db","Ports":"0.0.0.0:5432->5432/tcp"}
{"ID":"d4e5f6","Image":"ghcr.io/acme/zen-mcp:latest","Names":"zen_worker","Ports":""}
{"ID":"0719aa","Image":"ghcr.io/acme/zen-mcp:latest","Names":"zen-mcp-1","Ports":"0.0.0.0:8123->8000/tcp, :::8123->8000/tcp"}
not json
"#;

    #[test]
    fn published_port_is_the_host_side() {
        assert_eq!(first_published_port("0.0.0.0:8080->8080/tcp"), Some(8080));
        assert_eq!(
            first_published_port("8000/tcp, 127.0.0.1:9001->9000/tcp"),
            Some(9001)
        );
        assert_eq!(first_published_port(":::8123->8000/tcp"), Some(8123));
        assert_eq!(first_published_port("8000/tcp"), None);
        assert_eq!(first_published_port(""), None);
    }

    #[test]
    fn parse_skips_bad_rows() {
        let rows = parse_container_list(PS_OUTPUT);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].names, "zen-mcp-1");
    }

    #[test]
    fn match_on_name_or_image() {
        let rows = parse_container_list(PS_OUTPUT);
        assert!(!rows[0].matches("zen-mcp"));
        assert!(rows[1].matches("zen-mcp"));
        assert!(rows[2].matches("ZEN-MCP"));
    }

    #[tokio::test]
    async fn missing_client_is_a_failure() {
        let detector = ContainerDetector::default();
        assert!(matches!(
            detector.detect("zen-mcp").await,
            Detection::Failed(_)
        ));
    }

    #[cfg(unix)]
    fn fake_docker(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("docker");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn published_container_is_found_through_client() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ps.out"), PS_OUTPUT).unwrap();
        let client = fake_docker(
            dir.path(),
            &format!("cat '{}'", dir.path().join("ps.out").display()),
        );

        let detector = ContainerDetector::with_client(client);
        let connection = detector.detect("zen-mcp").await.into_found().unwrap();

        assert_eq!(connection.url(), "http://localhost:8123");
        assert_eq!(connection.connection_type(), ConnectionType::Docker);
        assert_eq!(connection.resource_usage()["container_id"], "0719aa");
        assert_eq!(detector.detect("redis").await, Detection::NotFound);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn failing_client_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let client = fake_docker(dir.path(), "echo 'daemon not running' >&2; exit 1");

        let detector = ContainerDetector::with_client(client);
        match detector.detect("zen-mcp").await {
            Detection::Failed(reason) => assert!(reason.contains("daemon not running")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
