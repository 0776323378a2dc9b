use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use unitrail_game::{ConfigError, DataLoader, GameConfig, ReferenceLists};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid game configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("invalid reference lists in {path}: {source}")]
    References {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Directory holding the bundled `game.json` and `student_life.json`.
pub fn assets_data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("assets")
        .join("data")
}

/// Loads configuration and reference lists from JSON files on disk.
#[derive(Debug, Clone)]
pub struct FsLoader {
    config_path: PathBuf,
    references_path: PathBuf,
}

impl FsLoader {
    pub fn new(config_path: Option<PathBuf>, references_path: Option<PathBuf>) -> Self {
        let root = assets_data_root();
        Self {
            config_path: config_path.unwrap_or_else(|| root.join("game.json")),
            references_path: references_path.unwrap_or_else(|| root.join("student_life.json")),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

fn read(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl DataLoader for FsLoader {
    type Error = AssetError;

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        let json = read(&self.config_path)?;
        GameConfig::from_json(&json).map_err(|source| AssetError::Config {
            path: self.config_path.clone(),
            source,
        })
    }

    fn load_references(&self) -> Result<ReferenceLists, Self::Error> {
        let json = read(&self.references_path)?;
        ReferenceLists::from_json(&json).map_err(|source| AssetError::References {
            path: self.references_path.clone(),
            source,
        })
    }
}
