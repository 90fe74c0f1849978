//! Strategy 5: URL marker files left by earlier deployments.

use std::path::PathBuf;

use async_trait::async_trait;
use mcpdeploy_core::domain::is_http_url;
use mcpdeploy_core::paths::marker_candidates;
use mcpdeploy_core::{ConnectionType, HealthStatus, ServerConnection};
use mcpdeploy_runtime::lockfile::read_url_marker;
use tracing::debug;

use super::{Detection, Detector};

pub struct LockFileDetector {
    lock_dir: PathBuf,
}

impl LockFileDetector {
    pub const fn new(lock_dir: PathBuf) -> Self {
        Self { lock_dir }
    }
}

#[async_trait]
impl Detector for LockFileDetector {
    fn name(&self) -> &'static str {
        "lock_file"
    }

    async fn detect(&self, service: &str) -> Detection {
        let mut last_error = None;

        for path in marker_candidates(&self.lock_dir, service) {
            match read_url_marker(&path).await {
                Ok(Some(content)) if is_http_url(&content) => {
                    debug!(service, path = %path.display(), url = %content, "Found URL marker");
                    return Detection::Found(
                        ServerConnection::new(content, ConnectionType::User, HealthStatus::Unknown)
                            .with_resource("lock_file", path.display().to_string()),
                    );
                }
                Ok(Some(_)) => {
                    debug!(service, path = %path.display(), "Marker content is not a URL");
                }
                Ok(None) => {}
                Err(e) => last_error = Some(format!("{}: {e}", path.display())),
            }
        }

        last_error.map_or(Detection::NotFound, Detection::Failed)
    }
}
