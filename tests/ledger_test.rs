//! Tests for score tallies and history maintenance.

use std::sync::Arc;
use std::time::Duration;

use noughts::{GameController, GameMode, NoFeedback, Persistence, Phase, Scores, SessionSettings, Tally};
use noughts_core::rules::winner;
use noughts_core::{Difficulty, Mark, MoveSelector, Outcome};

const X_WINS: [usize; 5] = [0, 3, 1, 4, 2];
const O_WINS: [usize; 6] = [0, 3, 1, 4, 8, 5];
const DRAW: [usize; 9] = [0, 1, 2, 4, 3, 5, 7, 6, 8];

fn multi_player(persistence: Persistence) -> GameController {
    GameController::new(
        SessionSettings {
            mode: GameMode::Multi,
            ..SessionSettings::default()
        },
        MoveSelector::seeded(1),
        persistence,
        Arc::new(NoFeedback),
        Duration::ZERO,
    )
}

async fn play(controller: &GameController, moves: &[usize]) {
    controller.reset_game().await;
    for &index in moves {
        controller.make_move(index).await;
    }
}

#[tokio::test]
async fn test_scripted_games_produce_expected_outcomes() {
    let controller = multi_player(Persistence::in_memory());
    play(&controller, &X_WINS).await;
    play(&controller, &O_WINS).await;
    play(&controller, &DRAW).await;

    let outcomes: Vec<Outcome> = controller
        .history()
        .await
        .iter()
        .map(|entry| *entry.outcome())
        .collect();
    assert_eq!(outcomes, vec![Outcome::Won(Mark::X), Outcome::Won(Mark::O), Outcome::Draw]);
}

#[tokio::test]
async fn test_replaying_history_reproduces_board_and_outcome() {
    let controller = multi_player(Persistence::in_memory());
    play(&controller, &O_WINS).await;
    let final_board = *controller.snapshot().await.board();

    let history = controller.history().await;
    let board = history[0].replay().expect("legal move log");
    assert_eq!(board, final_board);
    assert_eq!(winner(&board), *history[0].outcome());
}

#[tokio::test]
async fn test_deleting_entries_adjusts_tallies() {
    let controller = multi_player(Persistence::in_memory());
    play(&controller, &X_WINS).await;
    play(&controller, &O_WINS).await;
    play(&controller, &DRAW).await;
    play(&controller, &X_WINS).await;
    assert_eq!(controller.scores().await.multi, Tally { x: 2, o: 1 });

    // Draws carry no score.
    let removed = controller.delete_history_entry(2).await.expect("draw entry");
    assert_eq!(*removed.outcome(), Outcome::Draw);
    assert_eq!(controller.scores().await.multi, Tally { x: 2, o: 1 });

    controller.delete_history_entry(0).await.expect("x win entry");
    assert_eq!(controller.scores().await.multi, Tally { x: 1, o: 1 });

    assert!(controller.delete_history_entry(7).await.is_none());
    assert_eq!(controller.history().await.len(), 2);

    controller.delete_history_entry(0).await;
    controller.delete_history_entry(0).await;
    assert!(controller.history().await.is_empty());
    assert_eq!(controller.scores().await, Scores::default());
}

#[tokio::test]
async fn test_reset_scores_keeps_history() {
    let controller = multi_player(Persistence::in_memory());
    play(&controller, &X_WINS).await;
    play(&controller, &O_WINS).await;

    controller.reset_scores().await;
    assert_eq!(controller.scores().await, Scores::default());
    assert_eq!(controller.history().await.len(), 2);

    // Deleting a game from before the reset leaves the zeroed tallies alone.
    controller.delete_history_entry(0).await;
    assert_eq!(controller.scores().await, Scores::default());

    play(&controller, &O_WINS).await;
    assert_eq!(controller.scores().await.multi, Tally { x: 0, o: 1 });
}

#[tokio::test]
async fn test_stored_scores_without_history_become_baseline() {
    let persistence = Persistence::in_memory();
    persistence.save_scores(&Scores {
        single: Tally { x: 3, o: 1 },
        multi: Tally { x: 0, o: 2 },
    });

    let controller = multi_player(persistence);
    assert_eq!(controller.scores().await.single, Tally { x: 3, o: 1 });

    play(&controller, &X_WINS).await;
    assert_eq!(controller.scores().await.multi, Tally { x: 1, o: 2 });

    controller.delete_history_entry(0).await;
    assert_eq!(controller.scores().await, Scores::default());
}

#[tokio::test(start_paused = true)]
async fn test_undoing_a_finished_game_keeps_stored_scores() {
    let stored = Scores {
        single: Tally { x: 4, o: 2 },
        multi: Tally { x: 3, o: 1 },
    };
    let persistence = Persistence::in_memory();
    persistence.save_scores(&stored);

    let controller = GameController::new(
        SessionSettings {
            mode: GameMode::Single,
            difficulty: Difficulty::Easy,
            human_mark: Mark::X,
        },
        MoveSelector::seeded(8),
        persistence.clone(),
        Arc::new(NoFeedback),
        Duration::from_millis(500),
    );
    while *controller.snapshot().await.phase() != Phase::Terminal {
        let index = controller.snapshot().await.board().empty_positions()[0].to_index();
        controller.make_move(index).await;
        controller.wait_for_ai().await;
    }
    assert_eq!(controller.history().await.len(), 1);

    assert!(controller.undo_move().await);
    assert!(controller.history().await.is_empty());
    assert_eq!(controller.scores().await, stored);
    assert_eq!(persistence.load_scores(), Some(stored));
}
