//! Persistence for scores, history, player names and the sound preference.
//!
//! Backends only store strings under keys ([`KeyValueBackend`]); every
//! backend gets the typed [`GameStore`] operations for free by storing JSON.
//! The engine talks to storage through [`Persistence`], which logs failures
//! and carries on, because a running session treats its in-memory state as
//! the source of truth.

mod error;
mod memory;
mod schema;
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::records::{HistoryEntry, PlayerNames, Scores};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Storage key for the score tallies.
pub const SCORES_KEY: &str = "scores";
/// Storage key for the completed-game history.
pub const HISTORY_KEY: &str = "game_history";
/// Storage key for the player names.
pub const NAMES_KEY: &str = "player_names";
/// Storage key for the sound preference.
pub const SOUND_KEY: &str = "sound_enabled";

/// String storage addressed by key.
pub trait KeyValueBackend: Send + Sync + Debug {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Typed storage operations used by the engine.
pub trait GameStore: Send + Sync + Debug {
    /// Loads score tallies.
    fn load_scores(&self) -> Result<Option<Scores>, StoreError>;
    /// Saves score tallies.
    fn save_scores(&self, scores: &Scores) -> Result<(), StoreError>;
    /// Loads the completed-game history.
    fn load_history(&self) -> Result<Option<Vec<HistoryEntry>>, StoreError>;
    /// Saves the completed-game history.
    fn save_history(&self, history: &[HistoryEntry]) -> Result<(), StoreError>;
    /// Loads player names.
    fn load_names(&self) -> Result<Option<PlayerNames>, StoreError>;
    /// Saves player names.
    fn save_names(&self, names: &PlayerNames) -> Result<(), StoreError>;
    /// Loads the sound preference.
    fn load_sound_preference(&self) -> Result<Option<bool>, StoreError>;
    /// Saves the sound preference.
    fn save_sound_preference(&self, enabled: bool) -> Result<(), StoreError>;
}

fn read<B, T>(backend: &B, key: &str) -> Result<Option<T>, StoreError>
where
    B: KeyValueBackend + ?Sized,
    T: DeserializeOwned,
{
    match backend.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn write<B, T>(backend: &B, key: &str, value: &T) -> Result<(), StoreError>
where
    B: KeyValueBackend + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    backend.put(key, &raw)
}

impl<B: KeyValueBackend> GameStore for B {
    fn load_scores(&self) -> Result<Option<Scores>, StoreError> {
        read(self, SCORES_KEY)
    }

    fn save_scores(&self, scores: &Scores) -> Result<(), StoreError> {
        write(self, SCORES_KEY, scores)
    }

    fn load_history(&self) -> Result<Option<Vec<HistoryEntry>>, StoreError> {
        read(self, HISTORY_KEY)
    }

    fn save_history(&self, history: &[HistoryEntry]) -> Result<(), StoreError> {
        write(self, HISTORY_KEY, history)
    }

    fn load_names(&self) -> Result<Option<PlayerNames>, StoreError> {
        read(self, NAMES_KEY)
    }

    fn save_names(&self, names: &PlayerNames) -> Result<(), StoreError> {
        write(self, NAMES_KEY, names)
    }

    fn load_sound_preference(&self) -> Result<Option<bool>, StoreError> {
        read(self, SOUND_KEY)
    }

    fn save_sound_preference(&self, enabled: bool) -> Result<(), StoreError> {
        write(self, SOUND_KEY, &enabled)
    }
}

/// Best-effort front for a [`GameStore`].
///
/// Read failures are logged and read as "nothing saved"; write failures are
/// logged and dropped.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Arc<dyn GameStore>,
}

impl Persistence {
    /// Wraps a store.
    pub fn new(store: impl GameStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// A fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Loads score tallies.
    #[instrument(skip(self))]
    pub fn load_scores(&self) -> Option<Scores> {
        recover("scores", self.store.load_scores())
    }

    /// Saves score tallies.
    #[instrument(skip(self))]
    pub fn save_scores(&self, scores: &Scores) {
        discard("scores", self.store.save_scores(scores));
    }

    /// Loads the completed-game history.
    #[instrument(skip(self))]
    pub fn load_history(&self) -> Option<Vec<HistoryEntry>> {
        recover("history", self.store.load_history())
    }

    /// Saves the completed-game history.
    #[instrument(skip(self, history), fields(entries = history.len()))]
    pub fn save_history(&self, history: &[HistoryEntry]) {
        discard("history", self.store.save_history(history));
    }

    /// Loads player names.
    #[instrument(skip(self))]
    pub fn load_names(&self) -> Option<PlayerNames> {
        recover("names", self.store.load_names())
    }

    /// Saves player names.
    #[instrument(skip(self))]
    pub fn save_names(&self, names: &PlayerNames) {
        discard("names", self.store.save_names(names));
    }

    /// Loads the sound preference.
    #[instrument(skip(self))]
    pub fn load_sound_preference(&self) -> Option<bool> {
        recover("sound preference", self.store.load_sound_preference())
    }

    /// Saves the sound preference.
    #[instrument(skip(self))]
    pub fn save_sound_preference(&self, enabled: bool) {
        discard("sound preference", self.store.save_sound_preference(enabled));
    }
}

fn recover<T>(what: &str, result: Result<Option<T>, StoreError>) -> Option<T> {
    match result {
        Ok(value) => {
            debug!(what, found = value.is_some(), "Loaded");
            value
        }
        Err(err) => {
            warn!(what, error = %err, "Load failed, using defaults");
            None
        }
    }
}

fn discard(what: &str, result: Result<(), StoreError>) {
    match result {
        Ok(()) => debug!(what, "Saved"),
        Err(err) => warn!(what, error = %err, "Save failed, keeping in-memory state"),
    }
}
