//! Aggregate health of cached deployments.

use chrono::Utc;
use mcpdeploy_core::ServerConnection;
use serde::Serialize;

use super::DiscoveryEngine;

/// Health of one cached service at report time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceHealth {
    pub service: String,
    pub connection: ServerConnection,
    pub healthy: bool,
    /// Seconds since the connection was discovered.
    pub age_secs: u64,
}

impl DiscoveryEngine {
    /// Re-verify every cached connection, expired ones included.
    ///
    /// Read-only: nothing is evicted.
    pub async fn health_report(&self) -> Vec<ServiceHealth> {
        let mut report = Vec::new();
        for (service, connection) in self.cache.snapshot() {
            let healthy = self.verify_health(&connection).await;
            let age_secs = connection.age(Utc::now()).as_secs();
            report.push(ServiceHealth {
                service,
                connection,
                healthy,
                age_secs,
            });
        }
        report
    }
}
