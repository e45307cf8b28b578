//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Mark, Outcome, Position};
use super::draw::is_full;
use tracing::instrument;

/// The eight winning lines: rows, columns, diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Returns the mark filling all three cells of `line`, if any.
pub fn line_owner(board: &Board, [a, b, c]: [Position; 3]) -> Option<Mark> {
    let cell = board.get(a);
    if cell != Cell::Empty && cell == board.get(b) && cell == board.get(c) {
        cell.mark()
    } else {
        None
    }
}

/// Evaluates the board.
///
/// Returns [`Outcome::Won`] for the first complete line found,
/// [`Outcome::Draw`] when no line is complete and no empty cell remains,
/// [`Outcome::Pending`] otherwise.
#[instrument(level = "trace")]
pub fn winner(board: &Board) -> Outcome {
    if let Some(mark) = LINES.iter().find_map(|line| line_owner(board, *line)) {
        return Outcome::Won(mark);
    }

    if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(marks: &[(usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(index, mark) in marks {
            board.place(Position::ALL[index], mark);
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(winner(&Board::new()), Outcome::Pending);
    }

    #[test]
    fn test_every_line_wins() {
        for line in LINES {
            for mark in [Mark::X, Mark::O] {
                let mut board = Board::new();
                for pos in line {
                    board.place(pos, mark);
                }
                assert_eq!(winner(&board), Outcome::Won(mark), "line {:?}", line);
            }
        }
    }

    #[test]
    fn test_diagonal_scenario() {
        let board = board_with(&[(0, Mark::X), (1, Mark::O), (4, Mark::X), (2, Mark::O), (8, Mark::X)]);
        assert_eq!(winner(&board), Outcome::Won(Mark::X));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        use Mark::{O, X};
        let cells = [X, O, X, X, O, O, O, X, X].map(Cell::Taken);
        assert_eq!(winner(&Board::from_cells(cells)), Outcome::Draw);
    }

    #[test]
    fn test_win_on_last_cell_is_not_draw() {
        use Mark::{O, X};
        let cells = [X, O, X, O, X, O, O, X, X].map(Cell::Taken);
        assert_eq!(winner(&Board::from_cells(cells)), Outcome::Won(X));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board = board_with(&[(0, Mark::X), (1, Mark::X)]);
        assert_eq!(winner(&board), Outcome::Pending);
    }
}
