use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use unitrail_game::{Progress, Snapshot, SnapshotStorage};

/// Single-slot snapshot persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotStorage for JsonFileStorage {
    type Error = std::io::Error;

    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let blob = snapshot.to_json().map_err(std::io::Error::other)?;
        fs::write(&self.path, blob)
    }

    fn load_snapshot(&self) -> Result<Option<Snapshot>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Progress::from_json(&blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_snapshot(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}
