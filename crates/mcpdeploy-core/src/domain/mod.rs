//! Domain value types.

mod connection;
mod requirements;

pub use connection::{
    ConnectionType, HealthStatus, NPX_CLOUD_URL, NPX_SCHEME, ServerConnection, is_http_url,
};
pub use requirements::ServerRequirements;
