//! Spawning of locally deployed servers.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

/// What to launch and where.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Combined stdout/stderr destination.
    pub log_path: PathBuf,
}

/// Spawn a server process.
///
/// Output goes to `log_path` rather than a pipe, so the server keeps running
/// after this process exits. On Unix the child is placed in its own process
/// group so a terminal interrupt aimed at the caller does not reach it.
pub fn spawn_server(plan: &LaunchPlan) -> io::Result<Child> {
    let log = open_log(&plan.log_path)?;
    let log_err = log.try_clone()?;

    let mut cmd = Command::new(&plan.program);
    cmd.args(&plan.args)
        .current_dir(&plan.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err));

    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn()?;
    debug!(
        program = %plan.program,
        pid = child.id(),
        log = %plan.log_path.display(),
        "Spawned server process"
    );
    Ok(child)
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}
