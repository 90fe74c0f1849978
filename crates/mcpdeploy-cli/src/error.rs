//! CLI-specific error types and exit code mapping.

use mcpdeploy_core::{ConfigError, DiscoveryError};
use mcpdeploy_discovery::EngineBuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// No running instance was found (`check`).
    #[error("No running instance of '{0}' found")]
    NotFound(String),

    /// Discovery or deployment failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (terminal output, lock directory).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error / not found
    /// - 64-78: Specific categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 1,
            Self::Discovery(err) => match err {
                DiscoveryError::NoStrategy(_) => 64,               // EX_USAGE
                DiscoveryError::InsufficientResources { .. } => 69, // EX_UNAVAILABLE
                DiscoveryError::LockTimeout { .. } => 75,          // EX_TEMPFAIL
                DiscoveryError::Deployment { .. } | DiscoveryError::Lock { .. } => 71, // EX_OSERR
            },
            Self::Io(_) => 74,     // EX_IOERR
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<EngineBuildError> for CliError {
    fn from(err: EngineBuildError) -> Self {
        match err {
            EngineBuildError::Config(e) => Self::Config(e.to_string()),
            EngineBuildError::HealthClient(e) => Self::Io(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
