//! Port allocation for spawned servers.

use mcpdeploy_core::ResourceProbe;
use tracing::debug;

/// Find the first available port in `[base_port, base_port + span)`.
///
/// Availability is judged by the resource probe, so the same fail-open rules
/// apply as everywhere else. Returns `None` when the whole range is taken.
pub async fn find_available_port(
    probe: &dyn ResourceProbe,
    base_port: u16,
    span: u16,
) -> Option<u16> {
    for offset in 0..span {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };

        if probe.is_port_available(port).await {
            debug!(port, "Allocated available port");
            return Some(port);
        }
        debug!(port, "Port unavailable, skipping");
    }

    None
}
