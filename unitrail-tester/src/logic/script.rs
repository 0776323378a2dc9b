//! Canned enhancement replies for offline runs.
//!
//! A script is a JSON document listing raw service replies (or failures) with
//! an optional tile filter and an artificial latency, replayed in order.
use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use unitrail_game::{
    AsyncEnhancer, Enhancement, EnhancementError, EnhancementRequest, Enhancer, TileKind,
    parse_enhancement,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    /// Tile code this reply applies to; any tile when absent.
    #[serde(default)]
    pub tile: Option<char>,
    #[serde(default)]
    pub delay_ms: u64,
    /// Raw reply text as the service would send it.
    #[serde(default)]
    pub reply: Option<String>,
    /// Simulated service failure message.
    #[serde(default)]
    pub error: Option<String>,
}

impl ScriptEntry {
    fn matches(&self, tile: TileKind) -> bool {
        self.tile.is_none_or(|code| code == tile.code())
    }

    fn outcome(&self) -> Result<Option<Enhancement>, EnhancementError> {
        if let Some(message) = &self.error {
            return Err(EnhancementError::Service(message.clone()));
        }
        match &self.reply {
            None => Ok(None),
            Some(text) => parse_enhancement(text).map(Some).ok_or_else(|| {
                EnhancementError::Malformed(text.chars().take(40).collect::<String>())
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnhancementScript {
    pub entries: Vec<ScriptEntry>,
}

/// Replays a script, cycling through entries that match the landing tile.
#[derive(Debug)]
pub struct ScriptedEnhancer {
    entries: Vec<ScriptEntry>,
    cursor: Cell<usize>,
}

impl ScriptedEnhancer {
    pub fn new(script: EnhancementScript) -> Self {
        Self {
            entries: script.entries,
            cursor: Cell::new(0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let script: EnhancementScript =
            serde_json::from_str(json).context("invalid enhancement script")?;
        Ok(Self::new(script))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    fn next_entry(&self, tile: TileKind) -> Option<&ScriptEntry> {
        let len = self.entries.len();
        let start = self.cursor.get();
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|idx| self.entries[*idx].matches(tile))
            .map(|idx| {
                self.cursor.set((idx + 1) % len);
                &self.entries[idx]
            })
    }
}

impl Enhancer for ScriptedEnhancer {
    fn enhance(
        &self,
        request: &EnhancementRequest,
    ) -> Result<Option<Enhancement>, EnhancementError> {
        self.next_entry(request.tile)
            .map_or(Ok(None), ScriptEntry::outcome)
    }
}

impl AsyncEnhancer for ScriptedEnhancer {
    async fn enhance(
        &self,
        request: &EnhancementRequest,
    ) -> Result<Option<Enhancement>, EnhancementError> {
        let Some(entry) = self.next_entry(request.tile) else {
            return Ok(None);
        };
        if entry.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(entry.delay_ms)).await;
        }
        entry.outcome()
    }
}
