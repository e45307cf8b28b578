//! Move records and replay.
//!
//! A [`MoveRecord`] is the unit of a session's log: who moved, where, and
//! when. Replaying a log on an empty board must always reproduce the board it
//! was recorded from.

use super::rules::winner;
use super::{Board, Mark, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A mark placed at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The mark placed.
    pub mark: Mark,
    /// Where it was placed.
    pub position: Position,
    /// When the move was applied.
    pub played_at: DateTime<Utc>,
}

impl MoveRecord {
    /// Creates a record stamped with the current time.
    pub fn now(mark: Mark, position: Position) -> Self {
        Self::new(mark, position, Utc::now())
    }

    /// Creates a record with an explicit timestamp.
    pub fn new(mark: Mark, position: Position, played_at: DateTime<Utc>) -> Self {
        Self {
            mark,
            position,
            played_at,
        }
    }
}

impl std::fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position.label())
    }
}

/// Reasons a move is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// Cell index outside 0-8.
    #[display("Cell {} is off the board", _0)]
    OutOfBounds(#[error(not(source))] usize),

    /// The cell is already taken.
    #[display("{} is already taken", _0)]
    CellOccupied(#[error(not(source))] Position),

    /// The game already has a result.
    #[display("Game is already over")]
    GameOver,

    /// The AI is still choosing its move.
    #[display("Waiting for the AI to move")]
    AiThinking,

    /// The mark is not the one to move.
    #[display("It's not {}'s turn", _0)]
    WrongMark(#[error(not(source))] Mark),
}

impl Board {
    /// Rebuilds a board by applying `moves` in order to an empty board.
    ///
    /// # Errors
    ///
    /// Fails on the first record that lands on a taken cell, breaks the
    /// X-first alternation, or follows a finished game.
    #[instrument(skip(moves), fields(moves = moves.len()))]
    pub fn replay(moves: &[MoveRecord]) -> Result<Board, MoveError> {
        let mut board = Board::new();
        let mut to_move = Mark::X;

        for record in moves {
            if winner(&board).is_terminal() {
                return Err(MoveError::GameOver);
            }
            if record.mark != to_move {
                return Err(MoveError::WrongMark(record.mark));
            }
            if !board.is_empty(record.position) {
                return Err(MoveError::CellOccupied(record.position));
            }
            board.place(record.position, record.mark);
            to_move = to_move.opponent();
        }

        debug!(filled = board.filled(), "Replayed move log");
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;

    fn log(moves: &[(Mark, usize)]) -> Vec<MoveRecord> {
        moves
            .iter()
            .map(|&(mark, index)| MoveRecord::now(mark, Position::ALL[index]))
            .collect()
    }

    #[test]
    fn test_replay_reproduces_board() {
        let moves = log(&[(Mark::X, 4), (Mark::O, 0), (Mark::X, 8)]);
        let board = Board::replay(&moves).expect("valid log");
        assert_eq!(board.get(Position::Center), crate::Cell::Taken(Mark::X));
        assert_eq!(board.get(Position::TopLeft), crate::Cell::Taken(Mark::O));
        assert_eq!(board.filled(), 3);
    }

    #[test]
    fn test_replay_rejects_occupied() {
        let moves = log(&[(Mark::X, 4), (Mark::O, 4)]);
        assert_eq!(
            Board::replay(&moves),
            Err(MoveError::CellOccupied(Position::Center))
        );
    }

    #[test]
    fn test_replay_rejects_out_of_turn() {
        let moves = log(&[(Mark::O, 4)]);
        assert_eq!(Board::replay(&moves), Err(MoveError::WrongMark(Mark::O)));
    }

    #[test]
    fn test_replay_rejects_moves_after_win() {
        let moves = log(&[
            (Mark::X, 0),
            (Mark::O, 3),
            (Mark::X, 1),
            (Mark::O, 4),
            (Mark::X, 2),
            (Mark::O, 5),
        ]);
        assert_eq!(Board::replay(&moves), Err(MoveError::GameOver));
        let finished = Board::replay(&moves[..5]).expect("valid prefix");
        assert_eq!(winner(&finished), Outcome::Won(Mark::X));
    }

    #[test]
    fn test_stored_log_still_replays() {
        let moves = log(&[(Mark::X, 4), (Mark::O, 0), (Mark::X, 2), (Mark::O, 6)]);
        let board = Board::replay(&moves).expect("valid log");

        let json = serde_json::to_string(&moves).expect("serialize log");
        let restored: Vec<MoveRecord> = serde_json::from_str(&json).expect("deserialize log");
        assert_eq!(restored, moves);
        assert_eq!(Board::replay(&restored), Ok(board));

        let stored_board: Board =
            serde_json::from_str(&serde_json::to_string(&board).expect("serialize board")).expect("deserialize board");
        assert_eq!(stored_board, board);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MoveError::CellOccupied(Position::Center).to_string(),
            "Center is already taken"
        );
        assert_eq!(MoveError::WrongMark(Mark::O).to_string(), "It's not O's turn");
    }
}
