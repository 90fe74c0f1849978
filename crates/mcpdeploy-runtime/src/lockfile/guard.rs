//! Cross-process deployment lock backed by an advisory file lock.
//!
//! The lock file lives in the shared lock directory, so every process on
//! the host contends for the same `mcp-<service>.deploy.lock`. The lock is
//! released when the guard is dropped; the file itself is left in place so
//! that waiters never race against a deleted inode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use mcpdeploy_core::paths::deploy_lock_file_name;
use thiserror::Error;
use tracing::{debug, trace};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::fcntl::{Flock, FlockArg};

/// How often a blocked acquirer retries.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Failure to take the deployment lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Timed out after {timeout:?} waiting for lock {}", path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("Lock file {} is unusable: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held exclusive lock for deploying one service.
#[derive(Debug)]
pub struct DeploymentLock {
    path: PathBuf,
    #[cfg(unix)]
    _lock: Flock<File>,
    #[cfg(not(unix))]
    _file: File,
}

/// Outcome of a single non-blocking lock attempt.
enum Attempt {
    Acquired(DeploymentLock),
    Busy,
}

impl DeploymentLock {
    /// Acquire the deployment lock for `service`, waiting up to `timeout`.
    ///
    /// A zero timeout makes exactly one attempt.
    pub async fn acquire(
        lock_dir: &Path,
        service: &str,
        timeout: Duration,
    ) -> Result<Self, LockError> {
        let path = lock_dir.join(deploy_lock_file_name(service));
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(lock_dir).map_err(io_err)?;

        let started = Instant::now();
        loop {
            match try_lock(&path).map_err(io_err)? {
                Attempt::Acquired(lock) => {
                    debug!(
                        service,
                        path = %path.display(),
                        waited_ms = started.elapsed().as_millis(),
                        "Acquired deployment lock"
                    );
                    return Ok(lock);
                }
                Attempt::Busy => {
                    if started.elapsed() >= timeout {
                        return Err(LockError::Timeout { path, timeout });
                    }
                    trace!(service, "Deployment lock busy, retrying");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DeploymentLock {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "Released deployment lock");
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
}

#[cfg(unix)]
fn try_lock(path: &Path) -> io::Result<Attempt> {
    let file = open_lock_file(path)?;
    match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(lock) => Ok(Attempt::Acquired(DeploymentLock {
            path: path.to_path_buf(),
            _lock: lock,
        })),
        Err((_, errno)) if errno == Errno::EWOULDBLOCK => Ok(Attempt::Busy),
        Err((_, errno)) => Err(io::Error::from(errno)),
    }
}

#[cfg(not(unix))]
fn try_lock(path: &Path) -> io::Result<Attempt> {
    let file = open_lock_file(path)?;
    match file.try_lock() {
        Ok(()) => Ok(Attempt::Acquired(DeploymentLock {
            path: path.to_path_buf(),
            _file: file,
        })),
        Err(std::fs::TryLockError::WouldBlock) => Ok(Attempt::Busy),
        Err(std::fs::TryLockError::Error(e)) => Err(e),
    }
}
