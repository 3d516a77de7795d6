//! # Configuration Module
//!
//! This module handles configuration management and data directory setup for Sonic.
//! It provides platform-appropriate data storage locations and the runtime
//! settings for the recommendation service.
//!
//! ## Data Storage
//!
//! Sonic stores its database (settings, queue, history) in the platform-standard
//! data directory:
//! - Linux: `~/.local/share/sonic/`
//! - macOS: `~/Library/Application Support/sonic/`
//! - Windows: `%APPDATA%\sonic\`
//!
//! ## Runtime Settings
//!
//! Every value can be overridden from the command line or the environment
//! (see [`crate::cli::Args`]):
//!
//! | Flag         | Environment      | Default                                               |
//! |--------------|------------------|-------------------------------------------------------|
//! | `--db`       | `SONIC_DB`       | `<data dir>/sonic/sonic.db`                           |
//! | `--api-key`  | `GEMINI_API_KEY` | stored key                                            |
//! | `--model`    | `SONIC_MODEL`    | `gemini-2.5-flash`                                    |
//! | `--endpoint` | `SONIC_ENDPOINT` | `https://generativelanguage.googleapis.com/v1beta`    |
//! | `--timeout`  | `SONIC_TIMEOUT`  | 30 seconds                                            |

use anyhow::{Result, Context};
use std::path::PathBuf;
use std::fs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Returns the platform-appropriate Sonic data directory, creating it if needed.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path to the sonic data directory
/// * `Err(anyhow::Error)` - If data directory cannot be determined or created
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The sonic subdirectory cannot be created due to permissions
/// - The filesystem is read-only
pub fn get_data_dir() -> Result<PathBuf> {
    // Get platform-appropriate data directory
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        ))?;

    // Create sonic subdirectory
    let sonic_dir = data_dir.join("sonic");
    fs::create_dir_all(&sonic_dir)
        .with_context(|| format!(
            "Failed to create Sonic data directory at {}. Please check file permissions.",
            sonic_dir.display()
        ))?;

    Ok(sonic_dir)
}

/// Returns the platform-appropriate database file path.
///
/// The database file is named `sonic.db` and holds the stored settings, the
/// song queue and the recommendation history.
///
/// # Examples
///
/// ```no_run
/// use sonic::config::get_db_path;
///
/// let db_path = get_db_path()?;
/// println!("Database location: {}", db_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("sonic.db"))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    /// Gemini model name
    pub model: String,
    /// Base URL of the Gemini REST API
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Key given on the command line or in the environment. Takes precedence
    /// over the stored key and is never written out.
    #[serde(skip)]
    pub api_key_override: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::with_db_path(get_db_path().unwrap_or_else(|_| PathBuf::from("sonic.db")))
    }
}

impl RuntimeConfig {
    /// Create configuration with explicit database path
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_override: None,
        }
    }

    /// Resolve the key to use: the override when non-blank, else the stored
    /// one when non-blank.
    #[must_use]
    pub fn resolve_api_key(&self, stored: Option<&str>) -> Option<String> {
        let usable = |key: &str| {
            let key = key.trim();
            (!key.is_empty()).then(|| key.to_string())
        };
        self.api_key_override
            .as_deref()
            .and_then(usable)
            .or_else(|| stored.and_then(usable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_db_path_returns_valid_path() {
        let path = get_db_path().expect("Should get valid path");
        assert_eq!(path.file_name().unwrap(), "sonic.db");

        // Parent directory should be named "sonic" and exist
        let parent = path.parent().expect("Should have parent directory");
        assert_eq!(parent.file_name().unwrap(), "sonic");
        assert!(parent.is_dir());
    }

    #[test]
    fn test_get_db_path_consistent_results() {
        let path1 = get_db_path().expect("First call should succeed");
        let path2 = get_db_path().expect("Second call should succeed");
        assert_eq!(path1, path2);
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::with_db_path(PathBuf::from("/tmp/x.db"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_api_key_precedence() {
        let mut config = RuntimeConfig::with_db_path(PathBuf::from("x.db"));
        assert_eq!(config.resolve_api_key(None), None);
        assert_eq!(config.resolve_api_key(Some(" stored ")), Some("stored".to_string()));

        config.api_key_override = Some("from-env".to_string());
        assert_eq!(config.resolve_api_key(Some("stored")), Some("from-env".to_string()));

        config.api_key_override = Some("   ".to_string());
        assert_eq!(config.resolve_api_key(Some("stored")), Some("stored".to_string()));
        assert_eq!(config.resolve_api_key(None), None);
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = RuntimeConfig::with_db_path(PathBuf::from("x.db"));
        config.api_key_override = Some("secret".to_string());
        let json = serde_json::to_string(&config).expect("serializable");
        assert!(!json.contains("secret"));
    }
}
