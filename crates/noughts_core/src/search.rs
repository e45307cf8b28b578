//! Minimax search with alpha-beta pruning.
//!
//! The 3x3 tree is small enough to search to the end, so there is no depth
//! limit, move ordering or transposition table. Every candidate is played on
//! the caller's board and taken back before the next one is tried.

use super::evaluate::{Evaluator, WIN_SCORE};
use super::rules::is_full;
use super::{Board, Mark, Position};
use tracing::{debug, instrument};

/// Exhaustive game-tree search for one side.
#[derive(Debug, Clone)]
pub struct Minimax {
    evaluator: Evaluator,
    nodes: u64,
}

impl Minimax {
    /// Creates a searcher that maximizes for `ai`.
    pub fn new(ai: Mark) -> Self {
        Self {
            evaluator: Evaluator::new(ai),
            nodes: 0,
        }
    }

    /// The mark being maximized.
    pub fn ai(&self) -> Mark {
        self.evaluator.ai()
    }

    /// Nodes visited since creation.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Scores `board` with `maximizing` telling whose turn it is.
    ///
    /// Wins score `WIN_SCORE - depth` and losses `-WIN_SCORE + depth`, so
    /// quicker wins and slower losses rank higher. Full boards score zero.
    /// Expansion stops as soon as `beta <= alpha`.
    ///
    /// `board` is left exactly as it was passed in.
    pub fn search(
        &mut self,
        board: &mut Board,
        depth: i32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;

        let score = self.evaluator.evaluate(board);
        if score == WIN_SCORE {
            return score - depth;
        }
        if score == -WIN_SCORE {
            return score + depth;
        }
        if is_full(board) {
            return 0;
        }

        let ai = self.ai();
        if maximizing {
            let mut best = i32::MIN;
            for pos in Position::ALL {
                if !board.is_empty(pos) {
                    continue;
                }
                board.place(pos, ai);
                best = best.max(self.search(board, depth + 1, false, alpha, beta));
                board.clear(pos);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = i32::MAX;
            for pos in Position::ALL {
                if !board.is_empty(pos) {
                    continue;
                }
                board.place(pos, ai.opponent());
                best = best.min(self.search(board, depth + 1, true, alpha, beta));
                board.clear(pos);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    /// Scores every empty cell as the AI's next move.
    ///
    /// Each score comes from a full-window search with the opponent to
    /// move, so values are exact rather than bounds.
    pub fn score_moves(&mut self, board: &Board) -> Vec<(Position, i32)> {
        let mut scratch = *board;
        let ai = self.ai();
        board
            .empty_positions()
            .into_iter()
            .map(|pos| {
                scratch.place(pos, ai);
                let score = self.search(&mut scratch, 0, false, i32::MIN, i32::MAX);
                scratch.clear(pos);
                (pos, score)
            })
            .collect()
    }

    /// Every empty cell achieving the best score, in index order.
    ///
    /// Empty when the board has no empty cell.
    #[instrument(skip(self, board), fields(ai = %self.ai()))]
    pub fn best_moves(&mut self, board: &Board) -> Vec<Position> {
        let before = self.nodes;
        let scored = self.score_moves(board);
        let Some(best) = scored.iter().map(|(_, score)| *score).max() else {
            return Vec::new();
        };
        let moves: Vec<Position> = scored
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(pos, _)| pos)
            .collect();
        debug!(
            best,
            candidates = moves.len(),
            nodes = self.nodes - before,
            "Search complete"
        );
        moves
    }
}
