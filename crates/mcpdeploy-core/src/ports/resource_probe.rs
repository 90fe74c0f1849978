//! Host resource probing port.
//!
//! The discovery engine asks this port about memory, CPU, ports and running
//! processes. The OS-backed implementation lives in `mcpdeploy-runtime`.

use async_trait::async_trait;

/// Port for querying host capacity and occupancy.
///
/// Every method is best effort: failures are folded into a sensible default
/// by the implementation instead of being returned.
#[async_trait]
pub trait ResourceProbe: Send + Sync {
    /// Available memory in megabytes.
    async fn available_memory_mb(&self) -> u64;

    /// Global CPU utilisation in percent, sampled over a short interval.
    async fn cpu_usage(&self) -> f32;

    /// Whether nothing is listening on `localhost:port`.
    ///
    /// Probe errors other than a refused connection count as available.
    async fn is_port_available(&self, port: u16) -> bool;

    /// Whether a process whose name or arguments contain `pattern` is running.
    async fn process_exists(&self, pattern: &str) -> bool;
}
