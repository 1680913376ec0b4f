//! File-based dataset snapshot at ~/.autoproposta/snapshot.json.
//!
//! Written after every successful remote load so the storefront can start
//! with the last known catalog when the backend is down. TTL: 7 days.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{DataProvider, Dataset, ProviderError};
use crate::catalog::Record;

const SNAPSHOT_TTL_MS: i64 = 7 * 24 * 3600 * 1000;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    saved_at: i64,
    dataset: Dataset,
}

pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    pub fn load_from(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".autoproposta")
            .join("snapshot.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<SnapshotFile, ProviderError> {
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// The stored dataset, if present, readable and not expired.
    pub fn current(&self) -> Option<Dataset> {
        let file = self.read_file().ok()?;
        let now = chrono::Utc::now().timestamp_millis();
        if now - file.saved_at > SNAPSHOT_TTL_MS {
            return None;
        }
        Some(file.dataset)
    }

    /// Persist a dataset, creating parent directories as needed.
    pub fn save(&self, dataset: &Dataset) -> Result<(), ProviderError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SnapshotFile {
            saved_at: chrono::Utc::now().timestamp_millis(),
            dataset: dataset.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl<T> DataProvider<T> for SnapshotProvider
where
    T: Record + Clone,
    Dataset: AsRef<[T]>,
{
    fn list_all(&self) -> Result<Vec<T>, ProviderError> {
        let ds = self.current().ok_or(ProviderError::SnapshotMiss)?;
        <Dataset as DataProvider<T>>::list_all(&ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Dealer, Vehicle};
    use tempfile::TempDir;

    fn test_snapshot() -> (SnapshotProvider, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");
        (SnapshotProvider::load_from(path), dir)
    }

    #[test]
    fn test_save_and_read_back() {
        let (snap, _dir) = test_snapshot();
        snap.save(&Dataset::sample()).unwrap();

        let vehicles: Vec<Vehicle> = snap.list_all().unwrap();
        assert_eq!(vehicles.len(), 6);
        let dealer: Option<Dealer> = snap.find_by_id("3").unwrap();
        assert_eq!(dealer.unwrap().city, "Belo Horizonte");
    }

    #[test]
    fn test_missing_file_is_miss() {
        let (snap, _dir) = test_snapshot();
        assert!(snap.current().is_none());
        let result: Result<Vec<Vehicle>, _> = snap.list_all();
        assert!(matches!(result, Err(ProviderError::SnapshotMiss)));
    }

    #[test]
    fn test_expired_snapshot_is_miss() {
        let (snap, _dir) = test_snapshot();
        snap.save(&Dataset::sample()).unwrap();

        let stale = SnapshotFile {
            saved_at: chrono::Utc::now().timestamp_millis() - SNAPSHOT_TTL_MS - 1,
            dataset: Dataset::sample(),
        };
        fs::write(snap.path(), serde_json::to_string(&stale).unwrap()).unwrap();
        assert!(snap.current().is_none());
    }

    #[test]
    fn test_corrupt_file_is_miss() {
        let (snap, _dir) = test_snapshot();
        snap.save(&Dataset::default()).unwrap();
        fs::write(snap.path(), "{ not json").unwrap();
        assert!(snap.current().is_none());
    }

    #[test]
    fn test_partial_dataset_defaults_missing_collections() {
        let (snap, _dir) = test_snapshot();
        snap.save(&Dataset::default()).unwrap();
        let json = format!(
            r#"{{ "savedAt": {}, "dataset": {{ "dealers": [] }} }}"#,
            chrono::Utc::now().timestamp_millis()
        );
        fs::write(snap.path(), json).unwrap();
        let ds = snap.current().unwrap();
        assert!(ds.vehicles.is_empty());
        assert!(ds.proposals.is_empty());
    }
}
