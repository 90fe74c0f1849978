//! OS-backed `ResourceProbe` implementation.
//!
//! Memory and process data come from `sysinfo`; port occupancy is checked
//! with a short TCP connect against every loopback address `localhost`
//! resolves to, so an IPv6-only listener counts as occupied too.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use mcpdeploy_core::ResourceProbe;
use sysinfo::{
    MINIMUM_CPU_UPDATE_INTERVAL, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind,
};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tracing::{debug, warn};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Lower bound for the CPU sampling window.
const CPU_SAMPLE_WINDOW: Duration = Duration::from_millis(250);

/// Default timeout for a single port probe.
pub const DEFAULT_PORT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Host resource monitor.
#[derive(Debug, Clone)]
pub struct SystemResourceMonitor {
    connect_timeout: Duration,
}

impl SystemResourceMonitor {
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for SystemResourceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PORT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl ResourceProbe for SystemResourceMonitor {
    async fn available_memory_mb(&self) -> u64 {
        let sampled = tokio::task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_memory();

            // Some platforms report 0 for available memory; free memory is the
            // closest stand-in there.
            match system.available_memory() {
                0 => system.free_memory(),
                available => available,
            }
        })
        .await;

        sampled.map_or_else(
            |e| {
                warn!(error = %e, "Memory sampling task failed");
                0
            },
            |bytes| bytes / BYTES_PER_MB,
        )
    }

    async fn cpu_usage(&self) -> f32 {
        let sampled = tokio::task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_cpu_usage();
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL.max(CPU_SAMPLE_WINDOW));
            system.refresh_cpu_usage();
            system.global_cpu_usage()
        })
        .await;

        sampled.unwrap_or_else(|e| {
            warn!(error = %e, "CPU sampling task failed");
            0.0
        })
    }

    async fn is_port_available(&self, port: u16) -> bool {
        for addr in loopback_addrs(port).await {
            if self.accepts_connection(addr).await {
                debug!(port, %addr, "Port is occupied");
                return false;
            }
        }
        true
    }

    async fn process_exists(&self, pattern: &str) -> bool {
        let needle = pattern.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }

        match tokio::task::spawn_blocking(move || scan_processes(&needle)).await {
            Ok(found) => found,
            Err(e) => {
                debug!(pattern, error = %e, "Process enumeration failed");
                false
            }
        }
    }
}

impl SystemResourceMonitor {
    /// Whether something accepts a TCP connection on `addr`.
    ///
    /// Refusals, other connect errors and timeouts all count as "nothing
    /// listening"; the latter two are logged.
    async fn accepts_connection(&self, addr: SocketAddr) -> bool {
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => false,
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "Port check failed, treating address as free");
                false
            }
            Err(_) => {
                debug!(%addr, "Port check timed out, treating address as free");
                false
            }
        }
    }
}

/// Loopback socket addresses to check for `port`: whatever `localhost`
/// resolves to, plus `127.0.0.1` and `::1`, without duplicates.
async fn loopback_addrs(port: u16) -> Vec<SocketAddr> {
    let mut addrs = vec![
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
        SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), port),
    ];
    match lookup_host(("localhost", port)).await {
        Ok(resolved) => {
            for addr in resolved {
                if !addrs.contains(&addr) {
                    addrs.push(addr);
                }
            }
        }
        Err(e) => debug!(port, error = %e, "Could not resolve localhost"),
    }
    addrs
}

fn scan_processes(needle: &str) -> bool {
    let mut system = System::new();
    // Command lines are only loaded when asked for.
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::OnlyIfNotSet),
    );
    let own_pid = sysinfo::get_current_pid().ok();

    system.processes().iter().any(|(pid, process)| {
        Some(*pid) != own_pid
            && process_matches(
                &process.name().to_string_lossy(),
                process.cmd().iter().map(|arg| arg.to_string_lossy()),
                needle,
            )
    })
}

/// Case-insensitive match of a lowercase `needle` against a process name or
/// any of its arguments.
pub(crate) fn process_matches<I, S>(name: &str, args: I, needle: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    name.to_lowercase().contains(needle)
        || args
            .into_iter()
            .any(|arg| arg.as_ref().to_lowercase().contains(needle))
}
