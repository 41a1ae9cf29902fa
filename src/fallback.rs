//! The local fallback store.
//!
//! A single JSON file holding the full list of locally persisted
//! transactions. Every mutation rewrites the whole file, which keeps the
//! on-disk state simple at the cost of write amplification. The volumes a
//! single household produces make that a non-issue.

use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{Error, transaction::Transaction};

/// The JSON snapshot file the app falls back to when the remote store is
/// unavailable.
///
/// The mutex serializes read-modify-write cycles across handlers, since a
/// snapshot rewrite that interleaves with another would drop records.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: Arc<Mutex<PathBuf>>,
}

impl SnapshotStore {
    /// Create a store backed by the file at `path`.
    ///
    /// The file does not need to exist yet, it is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(Mutex::new(path.into())),
        }
    }

    /// Read the full snapshot.
    ///
    /// A missing file is an empty snapshot, not an error.
    ///
    /// # Errors
    /// Returns [Error::SnapshotRead] if the file exists but cannot be read
    /// or parsed.
    pub fn read(&self) -> Result<Vec<Transaction>, Error> {
        let path = self.path.lock().expect("snapshot store lock was poisoned");

        let contents = match fs::read_to_string(&*path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(error) => return Err(Error::SnapshotRead(error.to_string())),
        };

        serde_json::from_str(&contents).map_err(|error| Error::SnapshotRead(error.to_string()))
    }

    /// Replace the snapshot with `transactions`.
    ///
    /// # Errors
    /// Returns [Error::SnapshotWrite] if the file cannot be written.
    pub fn write(&self, transactions: &[Transaction]) -> Result<(), Error> {
        let path = self.path.lock().expect("snapshot store lock was poisoned");

        let contents = serde_json::to_string(transactions)
            .map_err(|error| Error::SnapshotWrite(error.to_string()))?;

        fs::write(&*path, contents).map_err(|error| Error::SnapshotWrite(error.to_string()))
    }
}
