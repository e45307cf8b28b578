//! Game session state machine.
//!
//! A [`GameSession`] owns one playthrough: the board, whose turn it is, the
//! move log and the phase. It never sleeps, persists or emits feedback; it
//! reports what happened as a [`Transition`] and leaves pacing and side
//! effects to the [`GameController`](crate::GameController).

use noughts_core::rules::winner;
use noughts_core::{Board, Difficulty, Mark, MoveError, MoveRecord, MoveSelector, Outcome, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Who is playing.
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
pub enum GameMode {
    /// One human against the AI.
    #[default]
    Single,
    /// Two humans sharing the board.
    Multi,
}

/// Options fixed for the lifetime of a session (difficulty excepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Single or multi player.
    pub mode: GameMode,
    /// AI strength in single-player mode.
    pub difficulty: Difficulty,
    /// The human's mark in single-player mode.
    pub human_mark: Mark,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Single,
            difficulty: Difficulty::default(),
            human_mark: Mark::X,
        }
    }
}

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Phase {
    /// A human may move.
    AwaitingHuman,
    /// The AI's move is scheduled; human moves are refused.
    AiThinking,
    /// The board has a result.
    Terminal,
}

/// Identifies one scheduled AI turn.
///
/// Reset and undo retire the current ticket, so an AI turn scheduled before
/// them is recognised as stale when it finally runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AiTicket(u64);

/// What a session operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Rejected(MoveError),
    /// A move landed and the game goes on with a human to move.
    Continue(MoveRecord),
    /// The human moved and the AI must answer; hand `ticket` back to
    /// [`GameSession::complete_ai_turn`].
    AiTurn {
        /// The human's move.
        record: MoveRecord,
        /// Token for the scheduled AI turn.
        ticket: AiTicket,
    },
    /// A move ended the game.
    Finished {
        /// The final move.
        record: MoveRecord,
        /// The result.
        outcome: Outcome,
    },
    /// An AI turn arrived after it was cancelled.
    Stale,
}

/// Moves taken back by [`GameSession::undo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undone {
    /// Removed records, oldest first.
    pub removed: Vec<MoveRecord>,
    /// Whether the session had a result before the undo.
    pub was_terminal: bool,
}

/// One playthrough of tic-tac-toe.
#[derive(Debug, Clone)]
pub struct GameSession {
    settings: SessionSettings,
    board: Board,
    to_move: Mark,
    phase: Phase,
    moves: Vec<MoveRecord>,
    generation: u64,
    selector: MoveSelector,
}

impl GameSession {
    /// Starts a session.
    ///
    /// In single-player mode with the human on O, the AI plays X's opening
    /// move before this returns.
    #[instrument(skip(selector))]
    pub fn new(settings: SessionSettings, selector: MoveSelector) -> Self {
        let mut session = Self {
            settings,
            board: Board::new(),
            to_move: Mark::X,
            phase: Phase::AwaitingHuman,
            moves: Vec::new(),
            generation: 0,
            selector,
        };
        session.open();
        info!(mode = %settings.mode, human = %settings.human_mark, "Session started");
        session
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark whose turn it is.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Result recomputed from the board.
    pub fn outcome(&self) -> Outcome {
        winner(&self.board)
    }

    /// The move log, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Session settings.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// The AI's mark, or `None` in multi-player mode.
    pub fn ai_mark(&self) -> Option<Mark> {
        match self.settings.mode {
            GameMode::Single => Some(self.settings.human_mark.opponent()),
            GameMode::Multi => None,
        }
    }

    /// Changes AI strength without restarting.
    #[instrument(skip(self))]
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
    }

    /// Applies a human move by cell index (0-8).
    pub fn apply_human_index(&mut self, index: usize) -> Transition {
        match Position::from_index(index) {
            Some(pos) => self.apply_human_move(pos),
            None => {
                debug!(index, "Move off the board");
                Transition::Rejected(MoveError::OutOfBounds(index))
            }
        }
    }

    /// Applies a human move.
    ///
    /// Refused while the AI is thinking, after the game ends, or on a taken
    /// cell; a refused move leaves the session untouched.
    #[instrument(skip(self), fields(phase = %self.phase, to_move = %self.to_move))]
    pub fn apply_human_move(&mut self, pos: Position) -> Transition {
        match self.phase {
            Phase::AiThinking => return Transition::Rejected(MoveError::AiThinking),
            Phase::Terminal => return Transition::Rejected(MoveError::GameOver),
            Phase::AwaitingHuman => {}
        }
        if !self.board.is_empty(pos) {
            debug!(position = %pos, "Cell already taken");
            return Transition::Rejected(MoveError::CellOccupied(pos));
        }

        let record = self.place(pos);
        let outcome = self.outcome();
        if outcome.is_terminal() {
            self.phase = Phase::Terminal;
            info!(%outcome, "Game over");
            return Transition::Finished { record, outcome };
        }

        match self.settings.mode {
            GameMode::Single => {
                self.phase = Phase::AiThinking;
                self.generation += 1;
                debug!(generation = self.generation, "AI turn scheduled");
                Transition::AiTurn {
                    record,
                    ticket: AiTicket(self.generation),
                }
            }
            GameMode::Multi => Transition::Continue(record),
        }
    }

    /// Plays the AI's move for a previously issued ticket.
    ///
    /// Returns [`Transition::Stale`] if the ticket was retired by a reset or
    /// undo, or if no AI turn is pending.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn complete_ai_turn(&mut self, ticket: AiTicket) -> Transition {
        if self.phase != Phase::AiThinking || ticket.0 != self.generation {
            debug!(?ticket, phase = %self.phase, "Ignoring stale AI turn");
            return Transition::Stale;
        }

        let Some(record) = self.play_ai() else {
            debug_assert!(false, "AI asked to move on a full board");
            error!("AI asked to move on a full board");
            self.phase = Phase::Terminal;
            return Transition::Stale;
        };

        let outcome = self.outcome();
        if outcome.is_terminal() {
            self.phase = Phase::Terminal;
            info!(%outcome, "Game over");
            Transition::Finished { record, outcome }
        } else {
            self.phase = Phase::AwaitingHuman;
            Transition::Continue(record)
        }
    }

    /// Takes back the human's last move and the AI reply that followed it.
    ///
    /// Single-player only. Returns `None` (and changes nothing) in
    /// multi-player mode or when the human has not moved yet.
    #[instrument(skip(self), fields(moves = self.moves.len()))]
    pub fn undo(&mut self) -> Option<Undone> {
        if self.settings.mode != GameMode::Single {
            debug!("Undo ignored in multi-player mode");
            return None;
        }
        let human = self.settings.human_mark;
        let Some(last_human) = self.moves.iter().rposition(|record| record.mark == human) else {
            debug!("Nothing to undo");
            return None;
        };

        let was_terminal = self.phase == Phase::Terminal;
        let removed = self.moves.split_off(last_human);
        self.board = self.moves.iter().fold(Board::new(), |mut board, record| {
            board.place(record.position, record.mark);
            board
        });
        self.to_move = human;
        self.phase = Phase::AwaitingHuman;
        self.generation += 1;

        info!(removed = removed.len(), was_terminal, "Moves undone");
        Some(Undone {
            removed,
            was_terminal,
        })
    }

    /// Clears the board and log and starts over with the same settings.
    ///
    /// Returns the AI's opening move when the AI plays X.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Option<MoveRecord> {
        self.board = Board::new();
        self.to_move = Mark::X;
        self.phase = Phase::AwaitingHuman;
        self.moves.clear();
        self.generation += 1;
        let opening = self.open();
        info!("Session reset");
        opening
    }

    /// Replaces the settings and starts over.
    ///
    /// Returns the AI's opening move when the AI plays X.
    #[instrument(skip(self))]
    pub fn restart_with(&mut self, settings: SessionSettings) -> Option<MoveRecord> {
        self.settings = settings;
        self.reset()
    }

    fn open(&mut self) -> Option<MoveRecord> {
        if self.ai_mark() != Some(Mark::X) {
            return None;
        }
        let opening = self.play_ai();
        if opening.is_none() {
            warn!("AI could not open on an empty board");
        }
        opening
    }

    fn play_ai(&mut self) -> Option<MoveRecord> {
        let ai = self.to_move;
        let pos = self
            .selector
            .select_move(&self.board, ai, self.settings.difficulty)?;
        Some(self.place(pos))
    }

    fn place(&mut self, pos: Position) -> MoveRecord {
        let record = MoveRecord::now(self.to_move, pos);
        self.board.place(pos, self.to_move);
        self.moves.push(record);
        self.to_move = self.to_move.opponent();
        debug!(%record, "Move applied");
        record
    }
}
