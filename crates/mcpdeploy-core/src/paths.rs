//! Shared filesystem locations.
//!
//! Deployment locks and URL marker files live in one shared directory so
//! that every process on the host (not just this one) can see them.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding the shared lock directory.
pub const LOCK_DIR_ENV: &str = "MCPDEPLOY_LOCK_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the user's home directory.
    #[error("Cannot determine home directory")]
    NoHomeDir,
}

/// Resolve the shared lock directory.
///
/// Resolution order:
/// 1. `MCPDEPLOY_LOCK_DIR` environment variable
/// 2. `configured` (from `DiscoveryConfig::lock_dir`)
/// 3. The OS temp directory
pub fn resolve_lock_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = env::var_os(LOCK_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    configured.map_or_else(env::temp_dir, Path::to_path_buf)
}

/// Name of the URL marker file written after a successful deployment.
pub fn marker_file_name(service: &str) -> String {
    format!("mcp-{service}.lock")
}

/// Name of the advisory lock file guarding deployment of `service`.
pub fn deploy_lock_file_name(service: &str) -> String {
    format!("mcp-{service}.deploy.lock")
}

/// Name of the file receiving a spawned server's stdout and stderr.
pub fn log_file_name(service: &str) -> String {
    format!("mcp-{service}.log")
}

/// Conventional URL marker locations for `service`, in lookup order.
///
/// The shared lock dir comes first, then `~/.mcp/<service>.lock`.
pub fn marker_candidates(lock_dir: &Path, service: &str) -> Vec<PathBuf> {
    let mut candidates = vec![lock_dir.join(marker_file_name(service))];

    let tmp = env::temp_dir().join(marker_file_name(service));
    if !candidates.contains(&tmp) {
        candidates.push(tmp);
    }

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".mcp").join(format!("{service}.lock")));
    }

    candidates
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, PathError> {
    if path == "~" {
        return dirs::home_dir().ok_or(PathError::NoHomeDir);
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(dirs::home_dir().ok_or(PathError::NoHomeDir)?.join(rest));
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_lock_dir_is_used_without_env_override() {
        if env::var_os(LOCK_DIR_ENV).is_some() {
            return;
        }
        let dir = resolve_lock_dir(Some(Path::new("/var/run/mcp")));
        assert_eq!(dir, PathBuf::from("/var/run/mcp"));
        assert_eq!(resolve_lock_dir(None), env::temp_dir());
    }

    #[test]
    fn marker_candidates_start_with_lock_dir() {
        let dir = Path::new("/srv/locks");
        let candidates = marker_candidates(dir, "zen-mcp");

        assert_eq!(candidates[0], dir.join("mcp-zen-mcp.lock"));
        assert!(candidates.contains(&env::temp_dir().join("mcp-zen-mcp.lock")));
    }

    #[test]
    fn marker_candidates_do_not_repeat_temp_dir() {
        let candidates = marker_candidates(&env::temp_dir(), "context7");
        let tmp = env::temp_dir().join("mcp-context7.lock");
        assert_eq!(candidates.iter().filter(|c| **c == tmp).count(), 1);
    }

    #[test]
    fn expand_home_leaves_plain_paths_alone() {
        assert_eq!(
            expand_home("./zen-mcp-server").unwrap(),
            PathBuf::from("./zen-mcp-server")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/srv").unwrap(), home.join("srv"));
        }
    }
}
