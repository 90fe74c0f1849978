//! URL marker files.
//!
//! Format: a single line holding the base URL of a deployed server.
//! ```text
//! http://localhost:8003
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mcpdeploy_core::paths::marker_file_name;

/// Write the URL marker for `service` atomically using temp file + rename.
pub fn write_url_marker(lock_dir: &Path, service: &str, url: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(lock_dir)?;

    let filename = marker_file_name(service);
    let final_path = lock_dir.join(&filename);
    let temp_path = lock_dir.join(format!("{filename}.tmp"));

    fs::write(&temp_path, format!("{url}\n"))?;
    fs::rename(&temp_path, &final_path)?;

    Ok(final_path)
}

/// Read a marker file, returning its trimmed content.
///
/// A missing or blank file yields `Ok(None)`.
pub async fn read_url_marker(path: &Path) -> io::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let trimmed = content.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete the URL marker for `service` (idempotent).
pub fn delete_url_marker(lock_dir: &Path, service: &str) -> io::Result<()> {
    match fs::remove_file(lock_dir.join(marker_file_name(service))) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn written_marker_is_readable() {
        let dir = tempdir().unwrap();
        let path = write_url_marker(dir.path(), "zen-mcp", "http://localhost:8003").unwrap();

        assert_eq!(path, dir.path().join("mcp-zen-mcp.lock"));
        assert_eq!(
            read_url_marker(&path).await.unwrap().as_deref(),
            Some("http://localhost:8003")
        );
        assert!(!dir.path().join("mcp-zen-mcp.lock.tmp").exists());
    }

    #[tokio::test]
    async fn missing_or_blank_marker_reads_as_none() {
        let dir = tempdir().unwrap();
        assert_eq!(
            read_url_marker(&dir.path().join("absent.lock")).await.unwrap(),
            None
        );

        let blank = dir.path().join("blank.lock");
        fs::write(&blank, "  \n").unwrap();
        assert_eq!(read_url_marker(&blank).await.unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = write_url_marker(dir.path(), "zen-mcp", "http://localhost:8000").unwrap();

        delete_url_marker(dir.path(), "zen-mcp").unwrap();
        assert!(!path.exists());
        delete_url_marker(dir.path(), "zen-mcp").unwrap();
    }
}
