//! Resources command handler.
//!
//! Shows what the resource gate sees: available memory, CPU usage, port
//! occupancy and which services would fit in memory right now.

use anyhow::Result;
use mcpdeploy_core::{DiscoveryConfig, ResourceProbe};
use mcpdeploy_runtime::SystemResourceMonitor;

use crate::presentation::print_separator;

/// Ports probed when none are given: every configured known port.
pub fn default_ports(config: &DiscoveryConfig) -> Vec<u16> {
    let mut ports: Vec<u16> = config
        .services
        .values()
        .flat_map(|profile| profile.known_ports.iter().copied())
        .collect();
    ports.sort_unstable();
    ports.dedup();
    ports
}

/// Memory verdict per service with requirements, in name order.
pub fn memory_fit(config: &DiscoveryConfig, available_mb: u64) -> Vec<(String, u64, bool)> {
    config
        .services
        .iter()
        .filter_map(|(name, profile)| {
            profile.requirements.as_ref().map(|req| {
                (name.clone(), req.memory_mb, req.fits_memory(available_mb))
            })
        })
        .collect()
}

/// Execute the resources command.
pub async fn execute(config: &DiscoveryConfig, ports: &[u16]) -> Result<()> {
    let monitor = SystemResourceMonitor::new(config.port_probe_timeout());

    let available_mb = monitor.available_memory_mb().await;
    let cpu = monitor.cpu_usage().await;

    println!("Available memory: {available_mb} MB");
    println!("CPU usage:        {cpu:.1}%");
    if cpu > config.cpu_warn_percent {
        println!("  (above the {:.0}% warning threshold)", config.cpu_warn_percent);
    }

    let ports = if ports.is_empty() {
        default_ports(config)
    } else {
        ports.to_vec()
    };

    if !ports.is_empty() {
        println!();
        println!("{:<8} Status", "Port");
        print_separator(20);
        for port in ports {
            let status = if monitor.is_port_available(port).await {
                "free"
            } else {
                "in use"
            };
            println!("{port:<8} {status}");
        }
    }

    let fits = memory_fit(config, available_mb);
    if !fits.is_empty() {
        println!();
        println!("{:<24} {:>10} Fits", "Service", "Memory");
        print_separator(42);
        for (name, memory_mb, fits) in fits {
            let verdict = if fits { "yes" } else { "no" };
            println!("{name:<24} {memory_mb:>7} MB {verdict}");
        }
    }

    Ok(())
}
