//! Named blob storage for the live value table.
//!
//! Loading never fails the caller: a missing blob is the normal first-run
//! case and a corrupt one is reported and replaced by a fresh table.

use learner::{TableError, ValueTable};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt table blob: {0}")]
    Corrupt(#[from] TableError),
}

/// Key/value storage for serialized tables.
pub trait TableStore: Send {
    /// Returns `Ok(None)` when no blob exists under `name`.
    ///
    /// # Errors
    ///
    /// Any failure other than absence.
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the blob stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the blob cannot be written.
    fn save(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Stores each blob as `<dir>/<name>.bin`.
pub struct FsTableStore {
    dir: PathBuf,
}

impl FsTableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.bin"))
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io { path: path.to_path_buf(), source }
    }
}

impl TableStore for FsTableStore {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn save(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;
        let path = self.path_for(name);
        // Write then rename so a crash mid-write never leaves a torn blob.
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, bytes).map_err(|e| Self::io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        Ok(())
    }
}

/// In-process store, for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) {
        self.blobs.insert(name.to_owned(), bytes);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.blobs.get(name).map(Vec::as_slice)
    }
}

impl TableStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blobs.get(name).cloned())
    }

    fn save(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.insert(name.to_owned(), bytes.to_vec());
        Ok(())
    }
}

/// Loads the table named `name`, falling back to zeros when it is missing or
/// unusable.
#[must_use]
pub fn load_table(store: &dyn TableStore, name: &str, rows: usize, cols: usize) -> ValueTable {
    match try_load_table(store, name, rows, cols) {
        Ok(Some(table)) => {
            info!("Value table '{name}' loaded.");
            table
        }
        Ok(None) => {
            info!("No value table found under '{name}'. Initializing a new table.");
            ValueTable::zeros(rows, cols)
        }
        Err(e) => {
            warn!("Error loading value table '{name}': {e}. Initializing a new table.");
            ValueTable::zeros(rows, cols)
        }
    }
}

/// Like [`load_table`] but reports why a blob could not be used.
///
/// # Errors
///
/// [`StoreError::Io`] for unreadable storage, [`StoreError::Corrupt`] for a
/// blob that does not decode to a `rows x cols` table.
pub fn try_load_table(
    store: &dyn TableStore,
    name: &str,
    rows: usize,
    cols: usize,
) -> Result<Option<ValueTable>, StoreError> {
    let Some(bytes) = store.load(name)? else {
        return Ok(None);
    };
    Ok(Some(ValueTable::from_bytes(&bytes, rows, cols)?))
}

/// Serializes `table` and stores it under `name`.
///
/// # Errors
///
/// Propagates the store's write error.
pub fn save_table(store: &mut dyn TableStore, name: &str, table: &ValueTable) -> Result<(), StoreError> {
    store.save(name, &table.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let mut table = ValueTable::zeros(4, 2);
        table.set(3, 1, -2.0);
        save_table(&mut store, "q", &table).unwrap();
        assert_eq!(load_table(&store, "q", 4, 2), table);
    }

    #[test]
    fn corrupt_blob_falls_back_to_zeros() {
        let mut store = MemoryStore::new();
        store.insert("q", b"definitely not a table".to_vec());
        assert!(matches!(try_load_table(&store, "q", 4, 2), Err(StoreError::Corrupt(_))));
        assert!(load_table(&store, "q", 4, 2).is_zero());
    }

    #[test]
    fn missing_blob_is_none() {
        let store = MemoryStore::new();
        assert!(try_load_table(&store, "absent", 4, 2).unwrap().is_none());
    }
}
