//! Noughts - tic-tac-toe engine
//!
//! Game rules and the AI opponent live in [`noughts_core`]; this crate runs
//! games on top of them.
//!
//! # Architecture
//!
//! - **Session**: turn sequencing, AI-thinking phase, undo and reset
//! - **Controller**: async boundary that paces the AI and fans out side effects
//! - **Ledger**: score tallies derived from completed-game history
//! - **Store**: best-effort persistence over SQLite or memory
//! - **Feedback**: haptic/audio cues for a presentation layer
//!
//! # Example
//!
//! ```no_run
//! use noughts::{GameController, NoFeedback, Persistence, SessionSettings};
//! use noughts_core::MoveSelector;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let controller = GameController::new(
//!     SessionSettings::default(),
//!     MoveSelector::new(),
//!     Persistence::in_memory(),
//!     Arc::new(NoFeedback),
//!     Duration::from_millis(500),
//! );
//! controller.make_move(4).await;
//! controller.wait_for_ai().await;
//! println!("{}", controller.snapshot().await.board().display());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod controller;
mod feedback;
mod ledger;
mod records;
mod session;
mod store;
mod terminal;

// Crate-level exports - Configuration
pub use config::{ConfigError, EngineConfig};

// Crate-level exports - Controller
pub use controller::{GameController, Snapshot};

// Crate-level exports - Feedback
pub use feedback::{ChannelFeedback, Cue, FeedbackEvent, FeedbackSink, LogFeedback, NoFeedback};

// Crate-level exports - Scores and history
pub use ledger::Ledger;
pub use records::{HistoryEntry, PlayerNames, Scores, Tally};

// Crate-level exports - Session state machine
pub use session::{AiTicket, GameMode, GameSession, Phase, SessionSettings, Transition, Undone};

// Crate-level exports - Persistence
pub use store::{
    GameStore, HISTORY_KEY, KeyValueBackend, MemoryBackend, NAMES_KEY, Persistence, SCORES_KEY,
    SOUND_KEY, SqliteBackend, StoreError,
};

// Crate-level exports - Terminal front end
pub use terminal::{format_scores, run_terminal, status_message};
