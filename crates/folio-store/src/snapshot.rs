// ABOUTME: Whole-outline JSON snapshot stored in one well-known slot on disk.
// ABOUTME: Saves atomically (temp file, fsync, rename); corrupt or foreign snapshots load as "no prior state".

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use folio_core::Outline;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format tag written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted envelope around an outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub outline: Outline,
}

/// A single string-keyed snapshot slot: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    key: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    /// Location of the slot on disk.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    /// Overwrite the slot with `outline`. Creates the directory if needed.
    pub fn save(&self, outline: &Outline) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.dir)?;

        let data = SnapshotData {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            outline: outline.clone(),
        };
        let json = serde_json::to_string_pretty(&data)?;

        let final_path = self.path();
        let tmp_path = self.dir.join(format!("{}.tmp", self.key));

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path)?;

        Ok(())
    }

    /// Read the slot. An empty slot, unparseable JSON, or an unknown format
    /// version all yield `Ok(None)`; only I/O failures are errors.
    pub fn load(&self) -> Result<Option<Outline>, SnapshotError> {
        let contents = match fs::read_to_string(self.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SnapshotError::Io(e)),
        };

        match parse_snapshot(&contents) {
            Ok(data) if data.version == SNAPSHOT_VERSION => {
                tracing::debug!("loaded snapshot saved at {}", data.saved_at);
                Ok(Some(data.outline))
            }
            Ok(data) => {
                tracing::warn!(
                    "discarding snapshot with unsupported version {} (expected {})",
                    data.version,
                    SNAPSHOT_VERSION
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("discarding unparseable snapshot at {}: {}", self.path().display(), e);
                Ok(None)
            }
        }
    }

    /// Remove the slot. Clearing an empty slot is not an error.
    pub fn clear(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SnapshotError::Io(e)),
        }
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }
}

fn parse_snapshot(contents: &str) -> Result<SnapshotData, serde_json::Error> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Diagram, DiagramBody, Payload};
    use tempfile::TempDir;
    use ulid::Ulid;

    fn populated_outline() -> Outline {
        let mut outline = Outline::seeded();
        outline.add_subchapter().unwrap();
        outline.rename_selected("Scope", "What is included");
        let id = Ulid::new();
        outline
            .insert_diagram(Diagram {
                id,
                title: "Photo".to_string(),
                description: String::new(),
                body: DiagramBody::Image {
                    payload: Payload::inline(vec![0x89, 0x50, 0x4e, 0x47]),
                },
            })
            .unwrap();
        outline
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), "outline");
        let outline = populated_outline();

        store.save(&outline).unwrap();
        let loaded = store.load().unwrap().expect("should find snapshot");

        assert_eq!(loaded, outline);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), "outline");

        store.save(&populated_outline()).unwrap();
        let replacement = Outline::seeded();
        store.save(&replacement).unwrap();

        assert_eq!(store.load().unwrap(), Some(replacement));
        assert!(!dir.path().join("outline.tmp").exists());
    }

    #[test]
    fn load_returns_none_for_missing_slot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("never-created"), "outline");

        assert!(store.load().unwrap().is_none());
        assert!(!store.exists());
    }

    #[test]
    fn load_discards_corrupt_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), "outline");
        fs::write(store.path(), b"{\"version\":1,\"outline\":{\"chap").unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn load_discards_unknown_version() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), "outline");
        store.save(&Outline::seeded()).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        value["version"] = serde_json::json!(99);
        fs::write(store.path(), serde_json::to_string(&value).unwrap()).unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("nested");
        let store = SnapshotStore::new(&nested, "outline");

        store.save(&Outline::seeded()).unwrap();
        assert!(nested.join("outline.json").exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), "outline");
        store.save(&Outline::seeded()).unwrap();

        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn slots_are_separated_by_key() {
        let dir = TempDir::new().unwrap();
        let a = SnapshotStore::new(dir.path(), "a");
        let b = SnapshotStore::new(dir.path(), "b");

        a.save(&Outline::seeded()).unwrap();
        assert!(b.load().unwrap().is_none());
        assert!(a.exists());
        assert!(!b.exists());
    }
}
