//! Station registry.
//!
//! Owns the collection of stations and hands out ids. All mutations go
//! through a single write lock, so concurrent creates always receive
//! distinct ids and every list call sees a consistent view.

mod error;
mod snapshot;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{Station, StationId, StationName};

pub use error::RegistryError;
pub use snapshot::{Snapshot, SnapshotConfig, SnapshotData};

/// Mutable registry state guarded by the lock.
#[derive(Debug)]
struct Inner {
    /// Stations keyed by id. Ids increase with creation, so iteration
    /// order is insertion order.
    stations: BTreeMap<StationId, Station>,
    next_id: StationId,
}

impl Inner {
    fn empty() -> Self {
        Self {
            stations: BTreeMap::new(),
            next_id: StationId::FIRST,
        }
    }

    fn from_snapshot(data: SnapshotData) -> Result<Self, RegistryError> {
        let stations: BTreeMap<_, _> = data.stations.into_iter().map(|s| (s.id, s)).collect();

        // Never hand out an id that is already stored, even if the file
        // was edited by hand.
        let after_last = match stations.keys().next_back() {
            Some(&last) => last.next().ok_or_else(|| RegistryError::Storage {
                message: format!("snapshot holds station id {last}, which has no successor"),
            })?,
            None => StationId::FIRST,
        };

        Ok(Self {
            stations,
            next_id: data.next_id.max(after_last),
        })
    }

    fn to_snapshot(&self) -> SnapshotData {
        SnapshotData {
            next_id: self.next_id,
            stations: self.stations.values().cloned().collect(),
        }
    }
}

/// Thread-safe station registry.
///
/// Cloning is cheap and every clone shares the same stations.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    inner: Arc<RwLock<Inner>>,
    snapshot: Option<Snapshot>,
}

impl StationRegistry {
    /// Create an empty, memory-only registry.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::empty())),
            snapshot: None,
        }
    }

    /// Create a registry backed by a snapshot file.
    ///
    /// Existing contents are loaded from the file; a missing file starts an
    /// empty registry.
    pub fn with_snapshot(snapshot: Snapshot) -> Result<Self, RegistryError> {
        let inner = match snapshot.load()? {
            Some(data) => {
                info!(
                    path = %snapshot.path().display(),
                    stations = data.stations.len(),
                    "loaded station snapshot"
                );
                Inner::from_snapshot(data)?
            }
            None => Inner::empty(),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            snapshot: Some(snapshot),
        })
    }

    /// Create a station with the given name.
    ///
    /// Duplicate names are allowed; only blank names are rejected.
    pub async fn create(&self, name: impl Into<String>) -> Result<Station, RegistryError> {
        let name = StationName::parse(name)?;

        let mut guard = self.inner.write().await;
        let id = guard.next_id;
        let next_id = id.next().ok_or(RegistryError::IdsExhausted)?;
        let station = Station { id, name };

        guard.stations.insert(id, station.clone());
        guard.next_id = next_id;

        if let Err(e) = self.persist(&guard) {
            guard.stations.remove(&id);
            guard.next_id = id;
            return Err(e);
        }

        info!(%id, name = %station.name, "created station");
        Ok(station)
    }

    /// All stations, in creation order.
    pub async fn list(&self) -> Vec<Station> {
        let guard = self.inner.read().await;
        debug!(count = guard.stations.len(), "listing stations");
        guard.stations.values().cloned().collect()
    }

    /// Look up a station by id.
    pub async fn get(&self, id: StationId) -> Option<Station> {
        let guard = self.inner.read().await;
        guard.stations.get(&id).cloned()
    }

    /// Delete the station with the given id.
    ///
    /// Returns [`RegistryError::NotFound`] if no such station exists. The
    /// id is never reused.
    pub async fn delete(&self, id: StationId) -> Result<(), RegistryError> {
        let mut guard = self.inner.write().await;

        let Some(removed) = guard.stations.remove(&id) else {
            warn!(%id, "delete of unknown station");
            return Err(RegistryError::NotFound(id));
        };

        if let Err(e) = self.persist(&guard) {
            guard.stations.insert(id, removed);
            return Err(e);
        }

        info!(%id, name = %removed.name, "deleted station");
        Ok(())
    }

    /// Remove every station and restart id allocation at 1.
    ///
    /// Used to isolate acceptance test cases from one another.
    pub async fn reset(&self) -> Result<(), RegistryError> {
        let mut guard = self.inner.write().await;
        let empty = Inner::empty();
        self.persist(&empty)?;
        *guard = empty;
        debug!("registry reset");
        Ok(())
    }

    /// Get the number of stored stations.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.stations.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.stations.is_empty()
    }

    fn persist(&self, inner: &Inner) -> Result<(), RegistryError> {
        match &self.snapshot {
            Some(snapshot) => snapshot.save(&inner.to_snapshot()),
            None => Ok(()),
        }
    }
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}
