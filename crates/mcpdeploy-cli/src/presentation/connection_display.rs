//! Rendering of a discovered connection.

use mcpdeploy_core::ServerConnection;
use serde_json::Value;

/// Human-readable `key: value` lines for a connection.
pub fn connection_lines(service: &str, connection: &ServerConnection) -> Vec<String> {
    let mut lines = vec![
        format!("Service:    {service}"),
        format!("URL:        {}", connection.url()),
        format!("Type:       {}", connection.connection_type()),
        format!("Status:     {}", connection.health_status()),
        format!(
            "Discovered: {}",
            connection.discovered_at().format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];

    for (key, value) in connection.resource_usage() {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("  {key}: {rendered}"));
    }

    lines
}

/// Pretty JSON for a connection, tagged with the service name.
pub fn connection_json(service: &str, connection: &ServerConnection) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(connection)?;
    if let Value::Object(map) = &mut value {
        map.insert("service".to_owned(), Value::String(service.to_owned()));
    }
    serde_json::to_string_pretty(&value)
}
