//! Server process lifecycle: spawn with a log file, stop with escalation.

mod shutdown;
mod spawn;

pub use shutdown::{SHUTDOWN_GRACE, shutdown_child};
pub use spawn::{LaunchPlan, spawn_server};
