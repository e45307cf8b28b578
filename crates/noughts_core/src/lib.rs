//! Pure tic-tac-toe logic: board, rules, evaluation, search and the
//! difficulty-tiered move selector.
//!
//! Nothing here does I/O or keeps time beyond stamping move records. The
//! session state machine that sequences turns lives in the `noughts` crate.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod evaluate;
mod policy;
mod position;
pub mod rules;
mod search;
mod types;

pub use action::{MoveError, MoveRecord};
pub use evaluate::{Evaluator, WIN_SCORE};
pub use policy::{Difficulty, MoveSelector};
pub use position::Position;
pub use search::Minimax;
pub use types::{Board, Cell, Mark, Outcome};
