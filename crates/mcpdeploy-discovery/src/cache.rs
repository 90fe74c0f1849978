//! Process-local deployment cache with a fixed TTL.
//!
//! Entries age from their `discovered_at` timestamp. The cache never checks
//! health itself; the engine decides whether a fresh entry is still usable.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mcpdeploy_core::ServerConnection;

#[derive(Debug)]
pub struct DeploymentCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, ServerConnection>>,
}

impl DeploymentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, connection: &ServerConnection, now: DateTime<Utc>) -> bool {
        connection.age(now) < self.ttl
    }

    /// Entry for `service` if it is younger than the TTL. Never evicts.
    pub fn get_fresh(&self, service: &str, now: DateTime<Utc>) -> Option<ServerConnection> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .filter(|c| self.is_fresh(c, now))
            .cloned()
    }

    /// Entry for `service` regardless of age.
    pub fn get(&self, service: &str) -> Option<ServerConnection> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    pub fn insert(&self, service: &str, connection: ServerConnection) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_owned(), connection);
    }

    pub fn remove(&self, service: &str) -> Option<ServerConnection> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(service)
    }

    /// Remove `service` only if it still holds `expected`.
    ///
    /// Used when evicting after a slow health check, so that an entry
    /// written concurrently is not lost.
    pub fn evict(&self, service: &str, expected: &ServerConnection) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(service) == Some(expected) {
            entries.remove(service);
            true
        } else {
            false
        }
    }

    /// All entries, sorted by service name.
    pub fn snapshot(&self) -> Vec<(String, ServerConnection)> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, connection)| (name.clone(), connection.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdeploy_core::{ConnectionType, HealthStatus};

    fn connection_at(discovered_at: DateTime<Utc>) -> ServerConnection {
        ServerConnection::new(
            "http://localhost:8000",
            ConnectionType::External,
            HealthStatus::Healthy,
        )
        .with_discovered_at(discovered_at)
    }

    #[test]
    fn fresh_entries_are_returned() {
        let cache = DeploymentCache::new(Duration::from_secs(300));
        let now = Utc::now();
        cache.insert("zen-mcp", connection_at(now - chrono::Duration::seconds(299)));

        assert!(cache.get_fresh("zen-mcp", now).is_some());
        assert!(cache.get_fresh("context7", now).is_none());
    }

    #[test]
    fn stale_entries_are_hidden_but_kept() {
        let cache = DeploymentCache::new(Duration::from_secs(300));
        let now = Utc::now();
        cache.insert("zen-mcp", connection_at(now - chrono::Duration::seconds(301)));

        assert!(cache.get_fresh("zen-mcp", now).is_none());
        assert!(cache.get("zen-mcp").is_some());
        assert!(cache.remove("zen-mcp").is_some());
        assert!(cache.get("zen-mcp").is_none());
    }

    #[test]
    fn evict_ignores_replaced_entries() {
        let cache = DeploymentCache::new(Duration::from_secs(300));
        let old = connection_at(Utc::now() - chrono::Duration::seconds(10));
        let new = connection_at(Utc::now());
        cache.insert("zen-mcp", new.clone());

        assert!(!cache.evict("zen-mcp", &old));
        assert_eq!(cache.get("zen-mcp"), Some(new.clone()));
        assert!(cache.evict("zen-mcp", &new));
        assert!(cache.get("zen-mcp").is_none());
    }

    #[test]
    fn snapshot_is_sorted() {
        let cache = DeploymentCache::new(Duration::from_secs(300));
        let now = Utc::now();
        cache.insert("zen-mcp", connection_at(now));
        cache.insert("context7", connection_at(now));

        let names: Vec<_> = cache.snapshot().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["context7", "zen-mcp"]);
    }
}
