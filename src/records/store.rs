//! JSON snapshot of a game: balance, recent history and statistics.

use crate::engine::pocket::WheelKind;
use crate::errors::StoreError;
use crate::records::history::RoundHistory;
use crate::records::stats::TableStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub wheel: WheelKind,
    pub balance: u64,
    pub history: RoundHistory,
    pub stats: TableStats,
    pub saved_at: DateTime<Utc>,
}

impl TableSnapshot {
    pub fn new(wheel: WheelKind, balance: u64, history: RoundHistory, stats: TableStats) -> Self {
        Self {
            wheel,
            balance,
            history,
            stats,
            saved_at: Utc::now(),
        }
    }
}

/// File-backed snapshot store
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved game, or `None` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<TableSnapshot>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: TableSnapshot = serde_json::from_str(&content)?;
        debug!("Loaded snapshot from {} (balance {})", self.path.display(), snapshot.balance);
        Ok(Some(snapshot))
    }

    /// Write the snapshot; a crash mid-write leaves the previous file intact.
    pub fn save(&self, snapshot: &TableSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        debug!("Saved snapshot to {}", self.path.display());
        Ok(())
    }

    /// Forget the saved game. Missing files are not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared snapshot {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
