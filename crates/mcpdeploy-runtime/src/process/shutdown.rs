//! Graceful shutdown for spawned servers with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;
#[cfg(unix)]
use tracing::debug;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Time a server gets to exit after SIGTERM before it is killed.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Stop a spawned server and reap it.
///
/// On Unix the child receives SIGTERM first and SIGKILL only if it is still
/// running after [`SHUTDOWN_GRACE`]. Elsewhere it is killed immediately.
pub async fn shutdown_child(mut child: Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    if let Some(status) = terminate(&mut child).await? {
        return Ok(status);
    }

    child.kill().await?;
    child.wait().await
}

/// Send SIGTERM and wait for the grace period.
///
/// Returns the exit status if the process went away on its own.
#[cfg(unix)]
async fn terminate(child: &mut Child) -> io::Result<Option<ExitStatus>> {
    let Some(pid) = child.id() else {
        // Already reaped.
        return child.wait().await.map(Some);
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => {}
        Err(nix::errno::Errno::ESRCH) => return child.wait().await.map(Some),
        Err(e) => return Err(io::Error::from(e)),
    }

    if let Ok(result) = timeout(SHUTDOWN_GRACE, child.wait()).await {
        return result.map(Some);
    }

    debug!(pid, "Process ignored SIGTERM, escalating to SIGKILL");
    Ok(None)
}
