//! Table formatting utilities for CLI output.

/// Truncates a string to a maximum length, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use mcpdeploy_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("context7", 10), "context7");
/// assert_eq!(truncate_string("sequential-thinking", 12), "sequentia...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Format an optional value for table display, returning a default if None.
pub fn format_optional<T: std::fmt::Display>(value: Option<T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_string("zen-mcp", 7), "zen-mcp");
        assert_eq!(truncate_string("@playwright/mcp", 8), "@play...");
        assert_eq!(truncate_string("ééééé", 4), "é...");
    }

    #[test]
    fn optional_uses_default() {
        assert_eq!(format_optional(Some(512), "--"), "512");
        assert_eq!(format_optional(None::<u64>, "--"), "--");
    }
}
