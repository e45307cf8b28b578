//! Presentation boundary for a running game.
//!
//! [`GameController`] owns the session, the ledger and the collaborators
//! behind one async mutex. Human moves are handled to completion under the
//! lock; the AI's answer runs later on a spawned task that sleeps for the
//! configured delay, so the player sees the AI "think". Reset, undo and any
//! settings change that restarts the session abort that task and retire its
//! ticket.

use crate::config::EngineConfig;
use crate::feedback::{Cue, FeedbackEvent, FeedbackSink};
use crate::ledger::Ledger;
use crate::records::{HistoryEntry, PlayerNames, Scores};
use crate::session::{AiTicket, GameMode, GameSession, Phase, SessionSettings, Transition};
use crate::store::Persistence;
use chrono::Utc;
use derive_getters::Getters;
use noughts_core::{Board, Difficulty, Mark, MoveRecord, MoveSelector, Outcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// Read-only copy of the session state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Snapshot {
    /// The board.
    board: Board,
    /// Mark whose turn it is.
    to_move: Mark,
    /// Turn-cycle phase.
    phase: Phase,
    /// Result derived from the board.
    outcome: Outcome,
    /// Move log, oldest first.
    moves: Vec<MoveRecord>,
    /// Session settings.
    settings: SessionSettings,
}

#[derive(Debug)]
struct Table {
    session: GameSession,
    ledger: Ledger,
    persistence: Persistence,
    feedback: Arc<dyn FeedbackSink>,
    names: PlayerNames,
    sound_enabled: bool,
    pending: Option<JoinHandle<()>>,
    recorded: Option<u64>,
}

impl Table {
    fn cue(&self, event: FeedbackEvent) {
        self.feedback.notify(Cue {
            event,
            sound_enabled: self.sound_enabled,
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!("Pending AI turn cancelled");
        }
    }

    /// Applies the side effects of a session transition.
    fn absorb(&mut self, transition: &Transition) {
        match transition {
            Transition::Rejected(err) => {
                debug!(error = %err, "Move rejected");
                self.cue(FeedbackEvent::InvalidMove);
            }
            Transition::Continue(_) | Transition::AiTurn { .. } => {
                self.cue(FeedbackEvent::MoveMade);
            }
            Transition::Finished { outcome, .. } => {
                let settings = self.session.settings();
                let entry = HistoryEntry::new(
                    settings.mode,
                    self.names.clone(),
                    settings.human_mark,
                    *outcome,
                    self.session.moves().to_vec(),
                    Utc::now(),
                );
                self.recorded = Some(self.ledger.record(entry));
                match outcome.winner() {
                    Some(mark) => self.cue(FeedbackEvent::Win(mark)),
                    None => self.cue(FeedbackEvent::Draw),
                }
            }
            Transition::Stale => {}
        }
    }

    fn restart(&mut self, settings: SessionSettings) {
        self.cancel_pending();
        self.recorded = None;
        if let Some(opening) = self.session.restart_with(settings) {
            self.absorb(&Transition::Continue(opening));
        }
    }
}

/// Drives one game session on behalf of a presentation layer.
///
/// Cloning yields another handle to the same game.
#[derive(Debug, Clone)]
pub struct GameController {
    inner: Arc<Mutex<Table>>,
    ai_delay: Duration,
}

impl GameController {
    /// Creates a controller, loading names, sound preference, scores and
    /// history from `persistence`.
    #[instrument(skip(selector, persistence, feedback))]
    pub fn new(
        settings: SessionSettings,
        selector: MoveSelector,
        persistence: Persistence,
        feedback: Arc<dyn FeedbackSink>,
        ai_delay: Duration,
    ) -> Self {
        let names = persistence.load_names().unwrap_or_default();
        let sound_enabled = persistence.load_sound_preference().unwrap_or(true);
        let ledger = Ledger::load(persistence.clone());
        let mut table = Table {
            session: GameSession::new(settings, selector),
            ledger,
            persistence,
            feedback,
            names,
            sound_enabled,
            pending: None,
            recorded: None,
        };
        if let Some(&opening) = table.session.moves().first() {
            table.absorb(&Transition::Continue(opening));
        }
        info!("Controller ready");
        Self {
            inner: Arc::new(Mutex::new(table)),
            ai_delay,
        }
    }

    /// Creates a controller from configuration.
    pub fn from_config(
        config: &EngineConfig,
        persistence: Persistence,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        let selector = config.seed().map_or_else(MoveSelector::new, MoveSelector::seeded);
        Self::new(
            config.session_settings(),
            selector,
            persistence,
            feedback,
            config.ai_delay(),
        )
    }

    /// Plays a human move at cell `index` (0-8).
    ///
    /// In single-player mode a successful move schedules the AI's reply; the
    /// returned transition describes only the human's move.
    #[instrument(skip(self))]
    pub async fn make_move(&self, index: usize) -> Transition {
        let mut table = self.inner.lock().await;
        let transition = table.session.apply_human_index(index);
        table.absorb(&transition);
        if let Transition::AiTurn { ticket, .. } = &transition {
            self.schedule_ai(&mut table, *ticket);
        }
        transition
    }

    fn schedule_ai(&self, table: &mut Table, ticket: AiTicket) {
        table.cancel_pending();
        let inner = Arc::clone(&self.inner);
        let delay = self.ai_delay;
        let task = async move {
            tokio::time::sleep(delay).await;
            let mut table = inner.lock().await;
            let transition = table.session.complete_ai_turn(ticket);
            if transition != Transition::Stale {
                table.pending = None;
            }
            table.absorb(&transition);
        };
        table.pending = Some(tokio::spawn(task.instrument(info_span!("ai_turn", ?ticket))));
        debug!(?delay, "AI turn scheduled");
    }

    /// Waits until no AI turn is pending.
    pub async fn wait_for_ai(&self) {
        let handle = self.inner.lock().await.pending.take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
            && !err.is_cancelled()
        {
            warn!(error = %err, "AI task failed");
        }
    }

    /// Takes back the human's last move and the AI reply to it.
    ///
    /// Undoing a finished game removes its history entry. Returns false when
    /// there was nothing to undo.
    #[instrument(skip(self))]
    pub async fn undo_move(&self) -> bool {
        let mut table = self.inner.lock().await;
        if table.session.settings().mode != GameMode::Single {
            debug!("Undo ignored in multi-player mode");
            return false;
        }
        table.cancel_pending();
        let Some(undone) = table.session.undo() else {
            return false;
        };
        if undone.was_terminal
            && let Some(id) = table.recorded.take()
        {
            table.ledger.retract(id);
        }
        true
    }

    /// Starts a new game with the same settings.
    #[instrument(skip(self))]
    pub async fn reset_game(&self) {
        let mut table = self.inner.lock().await;
        let settings = table.session.settings();
        table.restart(settings);
    }

    /// Switches between single and multi player and starts a new game.
    #[instrument(skip(self))]
    pub async fn select_game_mode(&self, mode: GameMode) {
        let mut table = self.inner.lock().await;
        let settings = SessionSettings {
            mode,
            ..table.session.settings()
        };
        table.restart(settings);
    }

    /// Chooses the human's mark and starts a new game.
    #[instrument(skip(self))]
    pub async fn select_player_mark(&self, mark: Mark) {
        let mut table = self.inner.lock().await;
        let settings = SessionSettings {
            human_mark: mark,
            ..table.session.settings()
        };
        table.restart(settings);
    }

    /// Changes AI strength for the current and later games.
    #[instrument(skip(self))]
    pub async fn select_difficulty(&self, difficulty: Difficulty) {
        self.inner.lock().await.session.set_difficulty(difficulty);
    }

    /// Renames the player holding `mark`.
    #[instrument(skip(self, name))]
    pub async fn set_player_name(&self, mark: Mark, name: impl Into<String>) {
        let mut table = self.inner.lock().await;
        table.names.set(mark, name);
        table.persistence.save_names(&table.names);
    }

    /// Turns audio cues on or off.
    #[instrument(skip(self))]
    pub async fn set_sound_enabled(&self, enabled: bool) {
        let mut table = self.inner.lock().await;
        table.sound_enabled = enabled;
        table.persistence.save_sound_preference(enabled);
    }

    /// Zeroes both modes' tallies; history is kept.
    pub async fn reset_scores(&self) {
        self.inner.lock().await.ledger.reset_scores();
    }

    /// Deletes the history entry at `index`, oldest first.
    #[instrument(skip(self))]
    pub async fn delete_history_entry(&self, index: usize) -> Option<HistoryEntry> {
        let mut table = self.inner.lock().await;
        let removed = table.ledger.delete(index)?;
        if table.recorded == Some(*removed.id()) {
            table.recorded = None;
        }
        Some(removed)
    }

    /// Current session state.
    pub async fn snapshot(&self) -> Snapshot {
        let table = self.inner.lock().await;
        let session = &table.session;
        Snapshot {
            board: *session.board(),
            to_move: session.to_move(),
            phase: session.phase(),
            outcome: session.outcome(),
            moves: session.moves().to_vec(),
            settings: session.settings(),
        }
    }

    /// Current tallies.
    pub async fn scores(&self) -> Scores {
        self.inner.lock().await.ledger.scores()
    }

    /// Completed games, oldest first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock().await.ledger.history().to_vec()
    }

    /// Player names.
    pub async fn names(&self) -> PlayerNames {
        self.inner.lock().await.names.clone()
    }

    /// Whether audio cues are on.
    pub async fn sound_enabled(&self) -> bool {
        self.inner.lock().await.sound_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::ChannelFeedback;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn controller(settings: SessionSettings) -> (GameController, UnboundedReceiver<Cue>) {
        let (sink, rx) = ChannelFeedback::channel();
        let controller = GameController::new(
            settings,
            MoveSelector::seeded(3),
            Persistence::in_memory(),
            Arc::new(sink),
            Duration::from_millis(500),
        );
        (controller, rx)
    }

    fn events(rx: &mut UnboundedReceiver<Cue>) -> Vec<FeedbackEvent> {
        let mut out = Vec::new();
        while let Ok(cue) = rx.try_recv() {
            out.push(cue.event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_ai_answers_after_delay() {
        let (controller, mut rx) = controller(SessionSettings {
            difficulty: Difficulty::Hard,
            ..SessionSettings::default()
        });
        let transition = controller.make_move(0).await;
        assert!(matches!(transition, Transition::AiTurn { .. }));
        assert_eq!(*controller.snapshot().await.phase(), Phase::AiThinking);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.snapshot().await.moves().len(), 1);

        controller.wait_for_ai().await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.moves().len(), 2);
        assert_eq!(*snapshot.phase(), Phase::AwaitingHuman);
        assert_eq!(events(&mut rx), vec![FeedbackEvent::MoveMade, FeedbackEvent::MoveMade]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_pending_ai_move() {
        let (controller, _rx) = controller(SessionSettings::default());
        controller.make_move(4).await;
        controller.reset_game().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        let snapshot = controller.snapshot().await;
        assert!(snapshot.moves().is_empty());
        assert_eq!(*snapshot.phase(), Phase::AwaitingHuman);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ai_opening_emits_move_cue() {
        let (controller, mut rx) = controller(SessionSettings {
            human_mark: Mark::O,
            ..SessionSettings::default()
        });
        assert_eq!(events(&mut rx), vec![FeedbackEvent::MoveMade]);

        controller.reset_game().await;
        assert_eq!(events(&mut rx), vec![FeedbackEvent::MoveMade]);

        controller.select_player_mark(Mark::X).await;
        assert!(events(&mut rx).is_empty());
        controller.select_player_mark(Mark::O).await;
        assert_eq!(events(&mut rx), vec![FeedbackEvent::MoveMade]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_move_cue() {
        let (controller, mut rx) = controller(SessionSettings {
            mode: GameMode::Multi,
            ..SessionSettings::default()
        });
        controller.make_move(4).await;
        controller.make_move(4).await;
        controller.make_move(12).await;
        assert_eq!(
            events(&mut rx),
            vec![
                FeedbackEvent::MoveMade,
                FeedbackEvent::InvalidMove,
                FeedbackEvent::InvalidMove
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sound_preference_travels_with_cues() {
        let (controller, mut rx) = controller(SessionSettings {
            mode: GameMode::Multi,
            ..SessionSettings::default()
        });
        controller.set_sound_enabled(false).await;
        controller.make_move(0).await;
        let cue = rx.try_recv().expect("a cue");
        assert!(!cue.sound_enabled);
        assert!(!controller.sound_enabled().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_difficulty_change_keeps_board() {
        let (controller, _rx) = controller(SessionSettings {
            mode: GameMode::Multi,
            ..SessionSettings::default()
        });
        controller.make_move(0).await;
        controller.select_difficulty(Difficulty::Easy).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.moves().len(), 1);
        assert_eq!(snapshot.settings().difficulty, Difficulty::Easy);
    }
}
