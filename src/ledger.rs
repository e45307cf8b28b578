//! Score tallies and completed-game history.
//!
//! Tallies are never stored on their own authority: they are the fold of the
//! counted history entries plus a baseline. The baseline carries the part of
//! the stored scores that no history entry accounts for. Resetting scores
//! drops it, and so does deleting the last history entry. Retracting an
//! undone game never touches it.

use crate::records::{HistoryEntry, Scores};
use crate::store::Persistence;
use tracing::{debug, info, instrument, warn};

/// Keeps score tallies and history in step and persists both.
#[derive(Debug, Clone)]
pub struct Ledger {
    history: Vec<HistoryEntry>,
    baseline: Scores,
    persistence: Persistence,
}

impl Ledger {
    /// Loads history and scores from `persistence`.
    #[instrument(skip(persistence))]
    pub fn load(persistence: Persistence) -> Self {
        let stored_scores = persistence.load_scores();
        let (history, baseline) = match persistence.load_history() {
            Some(history) => {
                let folded = Scores::tally(&history);
                let baseline = stored_scores.map_or_else(Scores::default, |stored| stored.less(folded));
                if baseline.combined(folded) != stored_scores.unwrap_or(folded) {
                    warn!(?stored_scores, ?folded, "Stored scores below history tally, using history");
                }
                (history, baseline)
            }
            None => (Vec::new(), stored_scores.unwrap_or_default()),
        };
        info!(entries = history.len(), "Ledger loaded");
        Self {
            history,
            baseline,
            persistence,
        }
    }

    /// Current tallies.
    pub fn scores(&self) -> Scores {
        self.baseline.combined(Scores::tally(&self.history))
    }

    /// Completed games, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Appends a completed game and returns its id.
    #[instrument(skip(self, entry), fields(outcome = %entry.outcome()))]
    pub fn record(&mut self, mut entry: HistoryEntry) -> u64 {
        let id = self
            .history
            .iter()
            .map(|entry| *entry.id())
            .max()
            .map_or(1, |max| max + 1);
        entry.assign_id(id);
        self.history.push(entry);
        info!(id, "Game recorded");
        self.persist();
        id
    }

    /// Removes the entry at `index` (oldest first).
    ///
    /// Out-of-range indices change nothing. Removing the last entry zeroes
    /// both modes.
    #[instrument(skip(self))]
    pub fn delete(&mut self, index: usize) -> Option<HistoryEntry> {
        if index >= self.history.len() {
            warn!(index, len = self.history.len(), "No history entry at index");
            return None;
        }
        let removed = self.history.remove(index);
        if self.history.is_empty() {
            self.baseline = Scores::default();
        }
        self.after_removal(&removed);
        Some(removed)
    }

    /// Removes the entry with `id`, used when a finished game is undone.
    ///
    /// Scores carried over from storage are kept even if history runs empty.
    #[instrument(skip(self))]
    pub fn retract(&mut self, id: u64) -> Option<HistoryEntry> {
        let Some(index) = self.history.iter().position(|entry| *entry.id() == id) else {
            debug!(id, "No history entry with id");
            return None;
        };
        let removed = self.history.remove(index);
        self.after_removal(&removed);
        Some(removed)
    }

    /// Zeroes both modes' tallies while keeping history.
    #[instrument(skip(self))]
    pub fn reset_scores(&mut self) {
        self.baseline = Scores::default();
        for entry in &mut self.history {
            entry.uncount();
        }
        info!("Scores reset");
        self.persist();
    }

    fn after_removal(&mut self, removed: &HistoryEntry) {
        info!(id = removed.id(), outcome = %removed.outcome(), "History entry removed");
        self.persist();
    }

    fn persist(&self) {
        self.persistence.save_history(&self.history);
        self.persistence.save_scores(&self.scores());
    }
}
