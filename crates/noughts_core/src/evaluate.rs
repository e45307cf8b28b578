//! Static position evaluation from the AI's point of view.

use super::rules::{threats, winner};
use super::{Board, Mark, Outcome};

/// Score of a won position for the side that won it.
pub const WIN_SCORE: i32 = 10;

/// Scores boards for one side.
///
/// Decided boards score [`WIN_SCORE`], `-WIN_SCORE` or zero. Undecided boards
/// score the difference in open threats, which is a rough signal only and
/// never reaches the win magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    ai: Mark,
}

impl Evaluator {
    /// Creates an evaluator for the AI playing `ai`.
    pub fn new(ai: Mark) -> Self {
        Self { ai }
    }

    /// The mark this evaluator favours.
    pub fn ai(&self) -> Mark {
        self.ai
    }

    /// Scores `board` for the AI.
    pub fn evaluate(&self, board: &Board) -> i32 {
        match winner(board) {
            Outcome::Won(mark) if mark == self.ai => WIN_SCORE,
            Outcome::Won(_) => -WIN_SCORE,
            Outcome::Draw => 0,
            Outcome::Pending => {
                let ours = threats(board, self.ai).len() as i32;
                let theirs = threats(board, self.ai.opponent()).len() as i32;
                ours - theirs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn test_win_and_loss_scores() {
        let mut board = Board::new();
        for pos in [Position::TopLeft, Position::Center, Position::BottomRight] {
            board.place(pos, Mark::O);
        }
        assert_eq!(Evaluator::new(Mark::O).evaluate(&board), WIN_SCORE);
        assert_eq!(Evaluator::new(Mark::X).evaluate(&board), -WIN_SCORE);
    }

    #[test]
    fn test_empty_board_is_neutral() {
        assert_eq!(Evaluator::new(Mark::O).evaluate(&Board::new()), 0);
    }

    #[test]
    fn test_threat_difference() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::O);
        board.place(Position::TopCenter, Mark::O);
        board.place(Position::BottomLeft, Mark::X);
        // O threatens top-right; X has nothing.
        assert_eq!(Evaluator::new(Mark::O).evaluate(&board), 1);
        assert_eq!(Evaluator::new(Mark::X).evaluate(&board), -1);
    }
}
