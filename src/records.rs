//! Persisted shapes: score tallies, player names and completed-game history.

use crate::session::GameMode;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use noughts_core::rules::winner;
use noughts_core::{Board, Mark, MoveError, MoveRecord, Outcome};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Win counters for one game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Games won by X.
    pub x: u32,
    /// Games won by O.
    pub o: u32,
}

impl Tally {
    /// Wins recorded for `mark`.
    pub fn wins(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    fn credit(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x = self.x.saturating_add(1),
            Mark::O => self.o = self.o.saturating_add(1),
        }
    }
}

/// Win tallies for both game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    /// Human versus AI.
    pub single: Tally,
    /// Human versus human.
    pub multi: Tally,
}

impl Scores {
    /// Tally for one mode.
    pub fn for_mode(&self, mode: GameMode) -> Tally {
        match mode {
            GameMode::Single => self.single,
            GameMode::Multi => self.multi,
        }
    }

    fn for_mode_mut(&mut self, mode: GameMode) -> &mut Tally {
        match mode {
            GameMode::Single => &mut self.single,
            GameMode::Multi => &mut self.multi,
        }
    }

    /// Folds the counted, decisive entries of `history` into tallies.
    #[instrument(skip(history), fields(entries = history.len()))]
    pub fn tally(history: &[HistoryEntry]) -> Self {
        history
            .iter()
            .filter(|entry| entry.counted)
            .filter_map(|entry| entry.outcome.winner().map(|mark| (entry.mode, mark)))
            .fold(Self::default(), |mut scores, (mode, mark)| {
                scores.for_mode_mut(mode).credit(mark);
                scores
            })
    }

    /// Subtracts `other` field by field, flooring at zero.
    pub fn less(self, other: Self) -> Self {
        let sub = |a: Tally, b: Tally| Tally {
            x: a.x.saturating_sub(b.x),
            o: a.o.saturating_sub(b.o),
        };
        Self {
            single: sub(self.single, other.single),
            multi: sub(self.multi, other.multi),
        }
    }

    /// Adds two sets of tallies field by field.
    pub fn combined(self, other: Self) -> Self {
        let add = |a: Tally, b: Tally| Tally {
            x: a.x.saturating_add(b.x),
            o: a.o.saturating_add(b.o),
        };
        Self {
            single: add(self.single, other.single),
            multi: add(self.multi, other.multi),
        }
    }
}

/// Display names for both marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    /// Name shown for X.
    pub x: String,
    /// Name shown for O.
    pub o: String,
}

impl PlayerNames {
    /// Name for `mark`.
    pub fn name(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    /// Replaces the name for `mark`.
    pub fn set(&mut self, mark: Mark, name: impl Into<String>) {
        match mark {
            Mark::X => self.x = name.into(),
            Mark::O => self.o = name.into(),
        }
    }
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            x: "Player X".to_string(),
            o: "Player O".to_string(),
        }
    }
}

/// Record of one completed game.
///
/// `id` is assigned by the [`Ledger`](crate::Ledger) when the entry is
/// recorded. `counted` drops to false when scores are reset after the game
/// finished, so the entry stays in history without feeding the tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct HistoryEntry {
    #[new(value = "0")]
    id: u64,
    mode: GameMode,
    names: PlayerNames,
    human_mark: Mark,
    outcome: Outcome,
    moves: Vec<MoveRecord>,
    completed_at: DateTime<Utc>,
    #[new(value = "true")]
    #[serde(default = "counted_by_default")]
    counted: bool,
}

fn counted_by_default() -> bool {
    true
}

impl HistoryEntry {
    pub(crate) fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    pub(crate) fn uncount(&mut self) {
        self.counted = false;
    }

    /// Rebuilds the final board from the move log.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the stored log is not a legal game.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn replay(&self) -> Result<Board, MoveError> {
        Board::replay(&self.moves)
    }

    /// True when replaying the log yields the stored outcome.
    pub fn is_consistent(&self) -> bool {
        self.replay()
            .map(|board| winner(&board) == self.outcome)
            .unwrap_or(false)
    }
}
