//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). None of them check that the
//! board is reachable in a legal game; callers pass whatever they hold.

pub mod draw;
pub mod threat;
pub mod win;

pub use draw::is_full;
pub use threat::threats;
pub use win::{LINES, line_owner, winner};
