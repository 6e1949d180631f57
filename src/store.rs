//! Snapshot persistence: a pluggable store for serialized tournament state.
//!
//! Store failures are never fatal to a running tournament; the engine logs a
//! warning and keeps operating on in-memory state.

use crate::models::{Tournament, TournamentId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Store I/O error: {}", e),
            StoreError::Serialization(e) => write!(f, "Store serialization error: {}", e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

/// Persistence adapter: stores a snapshot under the tournament's id and
/// retrieves it later. Implementations must round-trip the full state.
pub trait SnapshotStore {
    fn save(&self, tournament: &Tournament) -> Result<(), StoreError>;
    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError>;
}

/// Shared stores work too: an engine can hold an `Arc` to a store that
/// outlives it, e.g. for restore-after-eviction.
impl<S: SnapshotStore> SnapshotStore for std::sync::Arc<S> {
    fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        (**self).save(tournament)
    }

    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        (**self).load(id)
    }
}

/// One JSON file per tournament under a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        log::info!("Tournament store at {:?}", dir);
        Ok(Self { dir })
    }

    fn path(&self, id: TournamentId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let json = serde_json::to_vec(tournament)?;
        // Write to a sibling then rename, so a crash never leaves a torn file.
        let tmp = self.dir.join(format!("{}.json.tmp", tournament.id));
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, self.path(tournament.id))?;
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        match std::fs::read(self.path(id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store; used in tests and as a stand-in when no data directory
/// is wanted. Snapshots go through JSON so the round-trip matches the file
/// store's.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<TournamentId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let json = serde_json::to_string(tournament)?;
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tournament.id, json);
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.get(&id) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}
