//! Port definitions (trait abstractions) for host access.
//!
//! Ports contain no implementation details. Adapters live in
//! `mcpdeploy-runtime`; tests substitute in-memory fakes.

mod health;
mod resource_probe;

pub use health::{HealthVerifier, health_endpoint};
pub use resource_probe::ResourceProbe;
