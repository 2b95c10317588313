// ABOUTME: Configuration loading and validation for the folio editor.
// ABOUTME: Reads FOLIO_* environment variables and derives the snapshot and blob store locations.

use std::path::PathBuf;

use thiserror::Error;

/// Default snapshot slot name.
pub const DEFAULT_SNAPSHOT_KEY: &str = "folio-outline";

/// File name of the SQLite blob database under the home directory.
pub const BLOB_DB_FILE: &str = "files.db";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FOLIO_SNAPSHOT_KEY must be non-empty and use only letters, digits, '-' or '_': {0:?}")]
    InvalidSnapshotKey(String),
}

/// Editor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FolioConfig {
    pub home: PathBuf,
    pub snapshot_key: String,
    pub blobs_enabled: bool,
}

impl FolioConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - FOLIO_HOME: data directory (default: ~/.folio)
    /// - FOLIO_SNAPSHOT_KEY: snapshot slot name (default: folio-outline)
    /// - FOLIO_BLOBS: set to false/0/no to keep all binary content inline (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("FOLIO_HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".folio")
            });

        let snapshot_key = std::env::var("FOLIO_SNAPSHOT_KEY")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_KEY.to_string());
        if !is_valid_key(&snapshot_key) {
            return Err(ConfigError::InvalidSnapshotKey(snapshot_key));
        }

        let blobs_enabled = std::env::var("FOLIO_BLOBS")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            home,
            snapshot_key,
            blobs_enabled,
        })
    }

    /// Configuration rooted at an explicit directory, with defaults otherwise.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            blobs_enabled: true,
        }
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.home.clone()
    }

    pub fn blob_path(&self) -> PathBuf {
        self.home.join(BLOB_DB_FILE)
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
