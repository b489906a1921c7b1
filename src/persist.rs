//! Snapshot persistence
//!
//! A snapshot is three entries in a key-value store: the serialized
//! player progress, the level records, and the time it was written.
//! All three must be present and readable, and younger than
//! [`SNAPSHOT_EXPIRY`], for a load to return anything.

use crate::data::{Level, User};
use crate::game::GamePhase;
use crate::{GameError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const GAME_STATE_KEY: &str = "game_state";
pub const LEVELS_KEY: &str = "levels";
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Snapshots at least this old load as absent
pub const SNAPSHOT_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// ---------------------------------------------------------------------------
// Key-value backends
// ---------------------------------------------------------------------------

/// String key-value storage a snapshot is written into
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory, created on first write
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create save dir: {}", self.dir.display()))?;
        let path = self.path_for(key);
        std::fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Wall-clock source for snapshot timestamps, in ms since the Unix epoch
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(millis)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// The player record plus the menu phase they were on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub user: User,
    pub phase: GamePhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub progress: SavedProgress,
    pub levels: Vec<Level>,
}

/// Where the engine saves and restores its long-lived state
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// The stored snapshot, or `None` if it is missing, unreadable or expired
    fn load(&mut self) -> Option<Snapshot>;

    fn clear(&mut self) -> Result<()>;
}

/// [`SnapshotStore`] over any key-value backend and clock
#[derive(Debug, Clone)]
pub struct SnapshotAdapter<S, C> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> SnapshotAdapter<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read_entries(&self) -> Result<Option<(String, String, String)>> {
        let state = self.store.get(GAME_STATE_KEY)?;
        let levels = self.store.get(LEVELS_KEY)?;
        let timestamp = self.store.get(TIMESTAMP_KEY)?;
        Ok(match (state, levels, timestamp) {
            (Some(s), Some(l), Some(t)) => Some((s, l, t)),
            _ => None,
        })
    }
}

impl<S: KeyValueStore, C: Clock> SnapshotStore for SnapshotAdapter<S, C> {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let state = serde_json::to_string(&snapshot.progress).context("Failed to serialize progress")?;
        let levels = serde_json::to_string(&snapshot.levels).context("Failed to serialize levels")?;
        let now = self.clock.now_millis();

        // The timestamp marks a complete snapshot, so it goes first and comes back last
        self.store.remove(TIMESTAMP_KEY)?;
        self.store.set(GAME_STATE_KEY, &state)?;
        self.store.set(LEVELS_KEY, &levels)?;
        self.store.set(TIMESTAMP_KEY, &now.to_string())?;
        debug!(timestamp = now, "snapshot saved");
        Ok(())
    }

    fn load(&mut self) -> Option<Snapshot> {
        let (state, levels, timestamp) = match self.read_entries() {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                debug!("no complete snapshot stored");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "failed to read snapshot");
                return None;
            }
        };

        let Ok(saved_at) = timestamp.trim().parse::<i64>() else {
            warn!(timestamp = %timestamp.trim(), "ignoring snapshot with unreadable timestamp");
            return None;
        };

        let age = self.clock.now_millis().saturating_sub(saved_at);
        if age >= SNAPSHOT_EXPIRY.as_millis() as i64 {
            info!(age_ms = age, "snapshot expired, discarding");
            if let Err(e) = self.clear() {
                warn!(error = %e, "failed to remove expired snapshot");
            }
            return None;
        }

        match parse_entries(&state, &levels) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable snapshot");
                None
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        self.store.remove(GAME_STATE_KEY)?;
        self.store.remove(LEVELS_KEY)?;
        self.store.remove(TIMESTAMP_KEY)?;
        Ok(())
    }
}

fn parse_entries(state: &str, levels: &str) -> std::result::Result<Snapshot, GameError> {
    let progress = serde_json::from_str::<SavedProgress>(state)
        .map_err(|e| GameError::CorruptedSave(format!("game state: {e}")))?;
    let levels = serde_json::from_str::<Vec<Level>>(levels)
        .map_err(|e| GameError::CorruptedSave(format!("levels: {e}")))?;
    Ok(Snapshot { progress, levels })
}
