//! Shared-directory coordination files.
//!
//! - `DeploymentLock`: exclusive advisory lock held while deploying
//! - URL markers: the base URL of a server this host deployed, readable by
//!   any later discovery run

mod guard;
mod marker;

pub use guard::{DeploymentLock, LockError};
pub use marker::{delete_url_marker, read_url_marker, write_url_marker};
