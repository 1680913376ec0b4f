//! Data providers: where listings, dealers and proposals come from.
//!
//! Load chain:  remote backend → on-disk snapshot → built-in sample data.
//! A successful remote load refreshes the snapshot.

pub mod remote;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{sample, Dealer, Proposal, Record, Vehicle};

pub use remote::RemoteProvider;
pub use snapshot::SnapshotProvider;

/// Read access to one kind of record.
pub trait DataProvider<T: Record> {
    fn list_all(&self) -> Result<Vec<T>, ProviderError>;

    fn find_by_id(&self, id: &str) -> Result<Option<T>, ProviderError> {
        Ok(self.list_all()?.into_iter().find(|r| r.id() == id))
    }
}

/// Provider failures.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no usable snapshot")]
    SnapshotMiss,
}

/// A full materialized copy of the marketplace data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub dealers: Vec<Dealer>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

impl Dataset {
    /// The built-in reference data.
    pub fn sample() -> Self {
        Self {
            vehicles: sample::vehicles(),
            dealers: sample::dealers(),
            proposals: sample::proposals(),
        }
    }
}

impl AsRef<[Vehicle]> for Dataset {
    fn as_ref(&self) -> &[Vehicle] {
        &self.vehicles
    }
}

impl AsRef<[Dealer]> for Dataset {
    fn as_ref(&self) -> &[Dealer] {
        &self.dealers
    }
}

impl AsRef<[Proposal]> for Dataset {
    fn as_ref(&self) -> &[Proposal] {
        &self.proposals
    }
}

impl<T> DataProvider<T> for Dataset
where
    T: Record + Clone,
    Dataset: AsRef<[T]>,
{
    fn list_all(&self) -> Result<Vec<T>, ProviderError> {
        let records: &[T] = self.as_ref();
        Ok(records.to_vec())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<T>, ProviderError> {
        let records: &[T] = self.as_ref();
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }
}

/// Where the loaded dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Remote,
    Snapshot,
    Sample,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote backend"),
            Self::Snapshot => write!(f, "snapshot"),
            Self::Sample => write!(f, "built-in sample"),
        }
    }
}

/// Settings for the load chain.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub backend_url: Option<String>,
    pub snapshot_path: PathBuf,
    pub offline: bool,
    pub timeout: Duration,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            snapshot_path: SnapshotProvider::default_path(),
            offline: false,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Run the load chain. Never fails: the built-in sample is always there.
pub fn load_dataset(cfg: &DataConfig) -> (Dataset, DataSource) {
    let snapshot = SnapshotProvider::load_from(cfg.snapshot_path.clone());

    // 1. Remote backend (if configured and online)
    if let (false, Some(url)) = (cfg.offline, cfg.backend_url.as_deref()) {
        let remote = RemoteProvider::new(url, cfg.timeout);
        match remote.load_dataset() {
            Ok(ds) => {
                info!(
                    backend = url,
                    vehicles = ds.vehicles.len(),
                    dealers = ds.dealers.len(),
                    proposals = ds.proposals.len(),
                    "loaded dataset from remote backend"
                );
                if let Err(e) = snapshot.save(&ds) {
                    warn!(error = %e, path = %cfg.snapshot_path.display(), "failed to write snapshot");
                }
                return (ds, DataSource::Remote);
            }
            Err(e) => warn!(backend = url, error = %e, "remote backend unavailable"),
        }
    }

    // 2. Last snapshot
    if let Some(ds) = snapshot.current() {
        info!(path = %cfg.snapshot_path.display(), "loaded dataset from snapshot");
        return (ds, DataSource::Snapshot);
    }

    // 3. Built-in sample
    info!("using built-in sample dataset");
    (Dataset::sample(), DataSource::Sample)
}
