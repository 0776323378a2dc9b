//! Persisted progress and the storage port it travels through.
use crate::constants::SNAPSHOT_KEY;
use crate::stats::StatSet;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

/// Mutable player progress: level, stats, credits and board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub stats: StatSet,
    pub credits: i32,
    pub position: usize,
}

/// Persisted form of [`Progress`]; identical shape on disk.
pub type Snapshot = Progress;

impl Progress {
    /// Serialize to the JSON blob stored under [`SNAPSHOT_KEY`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored blob; corrupt or foreign data reads as no snapshot.
    #[must_use]
    pub fn from_json(blob: &str) -> Option<Self> {
        match serde_json::from_str(blob) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                log::warn!("ignoring unreadable snapshot: {err}");
                None
            }
        }
    }
}

/// Single-slot persistence for the current game.
pub trait SnapshotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), Self::Error>;

    /// Read the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read; unparseable
    /// content is `Ok(None)`.
    fn load_snapshot(&self) -> Result<Option<Snapshot>, Self::Error>;

    /// Remove the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    fn delete_snapshot(&self) -> Result<(), Self::Error>;
}

/// In-memory key/value storage keeping raw JSON blobs.
///
/// Clones share the same backing map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw blob under the snapshot key, bypassing serialization.
    pub fn put_raw(&self, blob: impl Into<String>) {
        self.blobs
            .borrow_mut()
            .insert(SNAPSHOT_KEY.to_string(), blob.into());
    }

    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.blobs.borrow().get(SNAPSHOT_KEY).cloned()
    }
}

impl SnapshotStorage for MemoryStorage {
    type Error = Infallible;

    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        if let Ok(blob) = snapshot.to_json() {
            self.put_raw(blob);
        }
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<Snapshot>, Self::Error> {
        Ok(self.raw().as_deref().and_then(Progress::from_json))
    }

    fn delete_snapshot(&self) -> Result<(), Self::Error> {
        self.blobs.borrow_mut().remove(SNAPSHOT_KEY);
        Ok(())
    }
}
