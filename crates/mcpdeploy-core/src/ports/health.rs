//! Health endpoint port.

use async_trait::async_trait;

/// Single-shot HTTP health probe.
#[async_trait]
pub trait HealthVerifier: Send + Sync {
    /// GET `<base_url>/health` and report whether it answered exactly 200.
    ///
    /// Network errors and timeouts are reported as unhealthy.
    async fn check(&self, base_url: &str) -> bool;
}

/// Build the health endpoint for a base URL.
pub fn health_endpoint(base_url: &str) -> String {
    format!("{}/health", base_url.trim().trim_end_matches('/'))
}
