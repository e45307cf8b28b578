//! Threat detection: cells that would complete a line.

use super::super::{Board, Cell, Mark, Position};
use super::win::LINES;
use tracing::instrument;

/// Returns every empty cell that would complete a line for `mark`.
///
/// A line contributes a threat when it holds exactly two of `mark` and one
/// empty cell. The result is sorted by index with duplicates removed, so a
/// cell completing two lines at once (a fork point) appears once.
#[instrument(level = "trace")]
pub fn threats(board: &Board, mark: Mark) -> Vec<Position> {
    let mut found: Vec<Position> = LINES
        .iter()
        .filter_map(|line| {
            let owned = line
                .iter()
                .filter(|pos| board.get(**pos) == Cell::Taken(mark))
                .count();
            let mut empty = line.iter().filter(|pos| board.is_empty(**pos));
            match (owned, empty.next(), empty.next()) {
                (2, Some(pos), None) => Some(*pos),
                _ => None,
            }
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::super::win::winner;
    use super::*;
    use crate::Outcome;

    #[test]
    fn test_no_threats_on_empty_board() {
        assert!(threats(&Board::new(), Mark::X).is_empty());
    }

    #[test]
    fn test_two_in_row_threatens_third() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::X);
        board.place(Position::TopCenter, Mark::X);
        assert_eq!(threats(&board, Mark::X), vec![Position::TopRight]);
        assert!(threats(&board, Mark::O).is_empty());
    }

    #[test]
    fn test_blocked_line_is_not_a_threat() {
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::X);
        board.place(Position::TopCenter, Mark::X);
        board.place(Position::TopRight, Mark::O);
        assert!(threats(&board, Mark::X).is_empty());
    }

    #[test]
    fn test_fork_reports_each_cell_once() {
        // X on 0, 2, 6: lines 0-1-2 and 0-3-6 both open; 4 completes 2-4-6.
        let mut board = Board::new();
        board.place(Position::TopLeft, Mark::X);
        board.place(Position::TopRight, Mark::X);
        board.place(Position::BottomLeft, Mark::X);
        assert_eq!(
            threats(&board, Mark::X),
            vec![Position::TopCenter, Position::MiddleLeft, Position::Center]
        );
    }

    #[test]
    fn test_filling_a_threat_wins() {
        let mut board = Board::new();
        board.place(Position::Center, Mark::O);
        board.place(Position::BottomCenter, Mark::O);
        board.place(Position::TopLeft, Mark::X);
        for pos in threats(&board, Mark::O) {
            assert!(board.is_empty(pos));
            let mut next = board;
            next.place(pos, Mark::O);
            assert_eq!(winner(&next), Outcome::Won(Mark::O));
        }
    }
}
