//! File persistence helpers.
//!
//! Default locations for the config file, database and accounts file, plus
//! JSON load/save with owner-only permissions.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;

/// Directory name used under the platform config and data dirs.
const APP_DIR: &str = "courier";

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/courier`
/// - macOS: `~/Library/Application Support/courier`
/// - Windows: `%APPDATA%\courier`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default data directory (database lives here).
///
/// - Linux: `~/.local/share/courier`
/// - macOS: `~/Library/Application Support/courier`
/// - Windows: `%APPDATA%\courier`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Returns the default database path.
pub fn default_database_path() -> PathBuf {
    default_data_dir().join("courier.db")
}

/// Returns the default accounts file path.
pub fn default_accounts_path() -> PathBuf {
    default_config_dir().join("accounts.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Restricts `path` to `mode` on Unix systems.
#[cfg(unix)]
async fn restrict(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = format!("{mode:o}"), "Set restrictive permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn restrict(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Saves data to a JSON file readable only by the owner.
///
/// Creates the parent directory (0700) if needed and writes atomically via
/// a temp file and rename.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    restrict(&temp_path, 0o600).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Loads data from a JSON file, returning the default when it is missing.
///
/// A file that exists but fails to parse is still an error.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, StoreError> {
    match load_json(path).await {
        Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "File not found, using defaults");
            Ok(T::default())
        }
        other => other,
    }
}

/// Ensures a directory exists, creating it owner-only.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || tokio::fs::try_exists(path).await? {
        return Ok(());
    }
    debug!(path = %path.display(), "Creating directory");
    tokio::fs::create_dir_all(path).await?;
    restrict(path, 0o700).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_default_paths() {
        assert!(default_config_path().ends_with("courier/config.json"));
        assert!(default_database_path().ends_with("courier/courier.db"));
        assert!(default_accounts_path().ends_with("accounts.json"));
    }

    #[tokio::test]
    async fn test_save_creates_parents_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("sample.json");
        let data = Sample {
            name: "courier".into(),
            count: 3,
        };

        save_json(&path, &data).await.unwrap();
        let loaded: Sample = load_json(&path).await.unwrap();
        assert_eq!(loaded, data);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Sample = load_json_or_default(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result: Result<Sample, _> = load_json_or_default(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        save_json(&path, &Sample::default()).await.unwrap();

        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "File should have 0600 permissions");
    }
}
