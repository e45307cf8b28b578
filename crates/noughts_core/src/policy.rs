//! Difficulty-tiered move selection.
//!
//! All randomness in the engine lives here. The search itself is
//! deterministic; the selector only picks among the moves it is handed.

use super::rules::threats;
use super::search::Minimax;
use super::{Board, Mark, Position};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// How strong the AI plays.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random legal moves.
    Easy,
    /// Coin flip between the strategic move and a random one.
    #[default]
    Medium,
    /// Optimal play; ties between equally good moves broken at random.
    Hard,
}

/// Chooses the AI's move for a given difficulty.
#[derive(Debug, Clone)]
pub struct MoveSelector {
    rng: StdRng,
}

impl MoveSelector {
    /// Creates a selector seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a selector with a fixed seed, for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Picks a move for `ai` on `board`.
    ///
    /// Returns `None` if the board has no empty cell.
    #[instrument(skip(self, board), fields(ai = %ai, difficulty = %difficulty))]
    pub fn select_move(&mut self, board: &Board, ai: Mark, difficulty: Difficulty) -> Option<Position> {
        let available = board.empty_positions();
        if available.is_empty() {
            return None;
        }

        let choice = match difficulty {
            Difficulty::Easy => available.choose(&mut self.rng).copied(),
            Difficulty::Medium => {
                if self.rng.random_bool(0.5) {
                    self.strategic_move(board, ai)
                } else {
                    available.choose(&mut self.rng).copied()
                }
            }
            Difficulty::Hard => {
                let best = Minimax::new(ai).best_moves(board);
                best.choose(&mut self.rng).copied()
            }
        };

        debug!(choice = ?choice, available = available.len(), "Selected AI move");
        choice
    }

    /// Rule-of-thumb move: win, block, center, corner, side, first free.
    ///
    /// Corners and sides are chosen at random among the free ones.
    #[instrument(skip(self, board), fields(ai = %ai))]
    pub fn strategic_move(&mut self, board: &Board, ai: Mark) -> Option<Position> {
        if let Some(win) = threats(board, ai).first() {
            return Some(*win);
        }
        if let Some(block) = threats(board, ai.opponent()).first() {
            return Some(*block);
        }
        if board.is_empty(Position::Center) {
            return Some(Position::Center);
        }

        for group in [Position::CORNERS, Position::SIDES] {
            let free: Vec<Position> = group.into_iter().filter(|pos| board.is_empty(*pos)).collect();
            if let Some(pos) = free.choose(&mut self.rng) {
                return Some(*pos);
            }
        }

        board.empty_positions().first().copied()
    }
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::new()
    }
}
