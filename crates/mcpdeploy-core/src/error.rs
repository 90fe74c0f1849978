//! Error taxonomy for discovery and deployment.
//!
//! Only failures that mean the caller's request cannot be satisfied live
//! here. Detection failures never surface as errors; they are folded into
//! "not found" by the engine.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `discover_server` and `teardown`.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Not enough memory to deploy locally and no on-demand fallback exists.
    #[error(
        "Insufficient resources for '{service}': requires {required_mb} MB, {available_mb} MB available"
    )]
    InsufficientResources {
        service: String,
        required_mb: u64,
        available_mb: u64,
    },

    /// No deployment strategy is registered for the service.
    #[error("No deployment strategy for '{0}'")]
    NoStrategy(String),

    /// The deployment strategy ran and failed.
    #[error("Failed to deploy '{service}': {reason}")]
    Deployment { service: String, reason: String },

    /// Another process held the deployment lock for the whole timeout.
    #[error("Timed out after {timeout:?} waiting for the deployment lock of '{service}'")]
    LockTimeout { service: String, timeout: Duration },

    /// The deployment lock file could not be opened or locked.
    #[error("Deployment lock for '{service}' failed: {source}")]
    Lock {
        service: String,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    pub fn deployment(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Deployment {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Service the error refers to.
    pub fn service(&self) -> &str {
        match self {
            Self::InsufficientResources { service, .. }
            | Self::Deployment { service, .. }
            | Self::LockTimeout { service, .. }
            | Self::Lock { service, .. }
            | Self::NoStrategy(service) => service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_service() {
        let err = DiscoveryError::InsufficientResources {
            service: "zen-mcp".to_owned(),
            required_mb: 512,
            available_mb: 100,
        };
        assert!(err.to_string().contains("zen-mcp"));
        assert!(err.to_string().contains("512 MB"));
        assert_eq!(err.service(), "zen-mcp");

        let err = DiscoveryError::deployment("zen-mcp", "no install location");
        assert_eq!(
            err.to_string(),
            "Failed to deploy 'zen-mcp': no install location"
        );

        assert_eq!(DiscoveryError::NoStrategy("x".to_owned()).service(), "x");
    }
}
