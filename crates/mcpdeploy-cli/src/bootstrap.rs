//! Composition root: logging, configuration and engine wiring.

use std::path::Path;

use mcpdeploy_core::DiscoveryConfig;
use mcpdeploy_discovery::DiscoveryEngine;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `-v`.
/// Logs go to stderr so command output stays parseable.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

/// Load the configuration file, or the built-in profiles when none is given.
pub fn load_config(path: Option<&Path>) -> Result<DiscoveryConfig, CliError> {
    match path {
        Some(path) => Ok(DiscoveryConfig::load(path)?),
        None => Ok(DiscoveryConfig::with_defaults()),
    }
}

pub fn build_engine(config: DiscoveryConfig) -> Result<DiscoveryEngine, CliError> {
    Ok(DiscoveryEngine::new(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_uses_builtin_profiles() {
        let config = load_config(None).unwrap();
        assert!(config.service("zen-mcp").is_some());
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcp.json");
        std::fs::write(&path, r#"{ "cache_ttl_secs": 0 }"#).unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_config(Some(Path::new("/nonexistent/mcpdeploy.json"))).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
