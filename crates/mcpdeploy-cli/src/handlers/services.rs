//! Services command handler.

use anyhow::Result;
use mcpdeploy_core::{DeploymentSpec, DiscoveryConfig};

use crate::presentation::{format_optional, print_separator, truncate_string};

/// One row of the services table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRow {
    pub name: String,
    pub strategy: &'static str,
    pub memory_mb: Option<u64>,
    pub ports: String,
    pub package: Option<String>,
}

pub fn service_rows(config: &DiscoveryConfig) -> Vec<ServiceRow> {
    config
        .services
        .iter()
        .map(|(name, profile)| ServiceRow {
            name: name.clone(),
            strategy: match profile.deployment {
                Some(DeploymentSpec::Subprocess(_)) => "subprocess",
                Some(DeploymentSpec::OnDemand) => "on_demand",
                None => "--",
            },
            memory_mb: profile.requirements.as_ref().map(|r| r.memory_mb),
            ports: profile
                .known_ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(","),
            package: profile.package.clone(),
        })
        .collect()
}

/// Execute the services command.
pub fn execute(config: &DiscoveryConfig) -> Result<()> {
    let rows = service_rows(config);
    if rows.is_empty() {
        println!("No services configured.");
        return Ok(());
    }

    println!(
        "{:<22} {:<11} {:>8} {:<16} Package",
        "Service", "Strategy", "Memory", "Known ports"
    );
    print_separator(90);

    for row in rows {
        println!(
            "{:<22} {:<11} {:>8} {:<16} {}",
            truncate_string(&row.name, 21),
            row.strategy,
            format_optional(row.memory_mb.map(|mb| format!("{mb} MB")), "--"),
            if row.ports.is_empty() { "--" } else { row.ports.as_str() },
            format_optional(row.package.as_deref(), "--"),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_listed_by_name() {
        let rows = service_rows(&DiscoveryConfig::with_defaults());
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(
            names,
            ["context7", "playwright", "sequential-thinking", "zen-mcp"]
        );

        let zen = rows.iter().find(|r| r.name == "zen-mcp").unwrap();
        assert_eq!(zen.strategy, "subprocess");
        assert_eq!(zen.memory_mb, Some(512));
        assert_eq!(zen.ports, "8000,8001,8080");
        assert_eq!(zen.package, None);

        let context7 = rows.iter().find(|r| r.name == "context7").unwrap();
        assert_eq!(context7.strategy, "on_demand");
        assert_eq!(context7.package.as_deref(), Some("@upstash/context7-mcp"));
    }

    #[test]
    fn empty_config_has_no_rows() {
        assert!(service_rows(&DiscoveryConfig::empty()).is_empty());
    }
}
