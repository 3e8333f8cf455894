//! In-memory agent repository for testing.
//!
//! This adapter provides a pure in-memory implementation of AgentRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    Result,
    error::{Error, LoadError},
    ports::AgentRepository,
    sarsa::SavedSarsaAgent,
};

/// In-memory repository for testing.
///
/// Stores records in memory using a shared HashMap keyed by path. Records are
/// kept as MessagePack bytes so that a save/load cycle goes through the same
/// serialization as the file adapters.
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // a panicking test thread cannot leave the map half-written
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the number of records currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored records.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a record exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    /// Store raw bytes at a path, bypassing serialization.
    pub fn insert_raw(&self, path: &Path, bytes: Vec<u8>) {
        self.storage().insert(key(path), bytes);
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl AgentRepository for InMemoryRepository {
    fn save(&self, record: &SavedSarsaAgent, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(record).map_err(|e| Error::SerializationContext {
            operation: "serialize agent for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> std::result::Result<SavedSarsaAgent, LoadError> {
        let storage = self.storage();

        let bytes = storage.get(&key(path)).ok_or_else(|| LoadError::Io {
            path: key(path),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| LoadError::Parse {
            path: key(path),
            message: e.to_string(),
        })
    }
}
