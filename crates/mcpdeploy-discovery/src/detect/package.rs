//! Strategy 4: package-manager artifacts in the project root.
//!
//! An installed binary under `node_modules/.bin` wins; otherwise the package
//! is looked up in `package.json`. Either way the result is an `npx`
//! connection, since the package runner starts the server on demand.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use mcpdeploy_core::domain::NPX_SCHEME;
use mcpdeploy_core::{ConnectionType, DiscoveryConfig, HealthStatus, ServerConnection};
use serde_json::Value;
use tracing::debug;

use super::{Detection, Detector};

const MANIFEST_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "optionalDependencies"];

/// Binary names a package may install, most specific first.
///
/// `@upstash/context7-mcp` yields `context7-mcp`, `upstash-context7-mcp`
/// and `context7`.
pub fn binary_name_candidates(package: &str) -> Vec<String> {
    let unscoped = package.trim_start_matches('@');
    let (scope, name) = match unscoped.split_once('/') {
        Some((scope, name)) => (Some(scope), name),
        None => (None, unscoped),
    };

    let mut candidates = vec![name.to_owned()];
    if let Some(scope) = scope {
        candidates.push(format!("{scope}-{name}"));
    }
    for stripped in [
        name.strip_suffix("-mcp"),
        name.strip_prefix("mcp-server-"),
        name.strip_prefix("server-"),
    ]
    .into_iter()
    .flatten()
    {
        candidates.push(stripped.to_owned());
    }

    candidates.retain(|c| !c.is_empty());
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

pub struct PackageDetector {
    config: Arc<DiscoveryConfig>,
    project_root: PathBuf,
}

impl PackageDetector {
    pub const fn new(config: Arc<DiscoveryConfig>, project_root: PathBuf) -> Self {
        Self {
            config,
            project_root,
        }
    }

    fn installed_binary(&self, package: &str) -> Option<PathBuf> {
        let bin_dir = self.project_root.join("node_modules").join(".bin");
        binary_name_candidates(package)
            .into_iter()
            .map(|name| bin_dir.join(name))
            .find(|path| path.exists())
    }

    /// Version string of `package` in the project manifest, if listed.
    async fn manifest_version(&self, package: &str) -> io::Result<Option<String>> {
        let path = self.project_root.join("package.json");
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let manifest: Value = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(MANIFEST_SECTIONS.iter().find_map(|section| {
            manifest
                .get(section)?
                .get(package)?
                .as_str()
                .map(str::to_owned)
        }))
    }
}

fn npx_connection(package: &str) -> ServerConnection {
    ServerConnection::new(
        format!("{NPX_SCHEME}://{package}"),
        ConnectionType::Npx,
        HealthStatus::Available,
    )
    .with_resource("package", package)
}

#[async_trait]
impl Detector for PackageDetector {
    fn name(&self) -> &'static str {
        "package"
    }

    async fn detect(&self, service: &str) -> Detection {
        let Some(package) = self.config.package(service) else {
            return Detection::NotFound;
        };

        if let Some(binary) = self.installed_binary(package) {
            debug!(service, package, binary = %binary.display(), "Found installed package binary");
            return Detection::Found(
                npx_connection(package).with_resource("binary", binary.display().to_string()),
            );
        }

        match self.manifest_version(package).await {
            Ok(Some(version)) => {
                debug!(service, package, version = %version, "Found package in manifest");
                Detection::Found(npx_connection(package).with_resource("version", version))
            }
            Ok(None) => Detection::NotFound,
            Err(e) => Detection::Failed(format!("unreadable package.json: {e}")),
        }
    }
}
