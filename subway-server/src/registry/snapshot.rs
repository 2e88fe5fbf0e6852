//! Disk snapshot of registry contents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::RegistryError;
use crate::domain::{Station, StationId};

/// Persisted registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Id the next created station will receive.
    pub next_id: StationId,
    /// Stored stations, in id order.
    pub stations: Vec<Station>,
}

/// Configuration for the registry snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Path to the snapshot file.
    pub path: PathBuf,
}

impl SnapshotConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// JSON file mirroring the registry after every mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    config: SnapshotConfig,
}

impl Snapshot {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Load the snapshot.
    ///
    /// Returns `Ok(None)` if the file doesn't exist. A file that exists but
    /// can't be read or parsed is an error, so a corrupt snapshot is never
    /// silently replaced by an empty registry.
    pub fn load(&self) -> Result<Option<SnapshotData>, RegistryError> {
        let contents = match std::fs::read_to_string(&self.config.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RegistryError::Storage {
                    message: format!("failed to read snapshot file: {}", e),
                });
            }
        };

        let data = serde_json::from_str(&contents).map_err(|e| RegistryError::Storage {
            message: format!("failed to parse snapshot: {}", e),
        })?;

        Ok(Some(data))
    }

    /// Write the snapshot.
    ///
    /// The data goes to a sibling temp file that is then renamed over the
    /// snapshot, so the snapshot is always either the old or the new
    /// contents. Creates parent directories if they don't exist.
    pub fn save(&self, data: &SnapshotData) -> Result<(), RegistryError> {
        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::Storage {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(data).map_err(|e| RegistryError::Storage {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, json).map_err(|e| RegistryError::Storage {
            message: format!("failed to write snapshot file: {}", e),
        })?;

        if let Err(e) = std::fs::rename(&tmp_path, &self.config.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(RegistryError::Storage {
                message: format!("failed to replace snapshot file: {}", e),
            });
        }

        Ok(())
    }

    /// Path of the temp file written before the rename.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.config.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationName;
    use tempfile::tempdir;

    fn station(id: u64, name: &str) -> Station {
        Station {
            id: StationId::new(id),
            name: StationName::parse(name).unwrap(),
        }
    }

    #[test]
    fn save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let snapshot = Snapshot::new(SnapshotConfig::new(dir.path().join("stations.json")));

        let data = SnapshotData {
            next_id: StationId::new(4),
            stations: vec![station(1, "강남역"), station(3, "언주역")],
        };

        snapshot.save(&data).unwrap();

        let loaded = snapshot.load().unwrap().unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn missing_snapshot_returns_none() {
        let dir = tempdir().unwrap();
        let snapshot = Snapshot::new(SnapshotConfig::new(dir.path().join("absent.json")));

        assert!(snapshot.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(&path, "not json").unwrap();
        let snapshot = Snapshot::new(SnapshotConfig::new(&path));

        let err = snapshot.load().unwrap_err();
        assert!(matches!(err, RegistryError::Storage { .. }));
        assert!(err.to_string().contains("failed to parse snapshot"));
    }

    #[test]
    fn save_replaces_existing_snapshot_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        let snapshot = Snapshot::new(SnapshotConfig::new(&path));

        let first = SnapshotData {
            next_id: StationId::new(2),
            stations: vec![station(1, "강남역")],
        };
        let second = SnapshotData {
            next_id: StationId::new(3),
            stations: vec![station(1, "강남역"), station(2, "역삼역")],
        };

        snapshot.save(&first).unwrap();
        snapshot.save(&second).unwrap();

        assert_eq!(snapshot.load().unwrap().unwrap(), second);
        assert!(!dir.path().join("stations.json.tmp").exists());
    }

    #[test]
    fn stale_temp_file_does_not_affect_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        let snapshot = Snapshot::new(SnapshotConfig::new(&path));

        let data = SnapshotData {
            next_id: StationId::new(2),
            stations: vec![station(1, "강남역")],
        };
        snapshot.save(&data).unwrap();

        // A write interrupted before the rename leaves only a partial temp file
        std::fs::write(dir.path().join("stations.json.tmp"), "{\"next_id\": 3, \"stat").unwrap();

        assert_eq!(snapshot.load().unwrap().unwrap(), data);
    }

    #[test]
    fn failed_replace_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::create_dir(&path).unwrap();
        let snapshot = Snapshot::new(SnapshotConfig::new(&path));

        let data = SnapshotData {
            next_id: StationId::FIRST,
            stations: Vec::new(),
        };

        let err = snapshot.save(&data).unwrap_err();
        assert!(matches!(err, RegistryError::Storage { .. }));
        assert!(!dir.path().join("stations.json.tmp").exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("stations.json");
        let snapshot = Snapshot::new(SnapshotConfig::new(&path));

        let data = SnapshotData {
            next_id: StationId::FIRST,
            stations: Vec::new(),
        };

        snapshot.save(&data).unwrap();
        assert!(path.exists());
        assert_eq!(snapshot.path(), path.as_path());
    }
}
