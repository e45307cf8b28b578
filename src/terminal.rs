//! Line-based terminal front end.

use crate::controller::{GameController, Snapshot};
use crate::records::{PlayerNames, Scores};
use crate::session::{GameMode, Phase, Transition};
use anyhow::Result;
use noughts_core::{Difficulty, Mark, Outcome};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

const HELP: &str = "\
Commands:
  1-9                 place your mark
  u                   undo your last move
  r                   new game
  m single|multi      switch mode
  d easy|medium|hard  set AI difficulty
  p x|o               choose your mark
  s                   show scores
  q                   quit";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Move(usize),
    Undo,
    Reset,
    Mode(GameMode),
    Difficulty(Difficulty),
    Mark(Mark),
    Scores,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or_else(|| "empty input".to_string())?;
        let arg = words.next();
        let parse_arg = |what: &str| arg.ok_or_else(|| format!("{} needs an argument", what));

        match head.to_ascii_lowercase().as_str() {
            "u" | "undo" => Ok(Command::Undo),
            "r" | "reset" => Ok(Command::Reset),
            "s" | "scores" => Ok(Command::Scores),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" => Ok(Command::Quit),
            "m" | "mode" => GameMode::from_str(parse_arg("mode")?)
                .map(Command::Mode)
                .map_err(|e| e.to_string()),
            "d" | "difficulty" => Difficulty::from_str(parse_arg("difficulty")?)
                .map(Command::Difficulty)
                .map_err(|e| e.to_string()),
            "p" | "play-as" => Mark::from_str(parse_arg("mark")?)
                .map(Command::Mark)
                .map_err(|e| e.to_string()),
            other => match other.parse::<usize>() {
                Ok(n @ 1..=9) => Ok(Command::Move(n - 1)),
                _ => Err(format!("unknown command '{}'", other)),
            },
        }
    }
}

/// Status line for the current state.
pub fn status_message(snapshot: &Snapshot, names: &PlayerNames) -> String {
    match snapshot.outcome() {
        Outcome::Won(mark) => format!("{} wins!", names.name(*mark)),
        Outcome::Draw => "It's a draw!".to_string(),
        Outcome::Pending if *snapshot.phase() == Phase::AiThinking => "AI is thinking...".to_string(),
        Outcome::Pending => format!("{}'s turn ({})", names.name(*snapshot.to_move()), snapshot.to_move()),
    }
}

/// Renders per-mode tallies.
pub fn format_scores(scores: &Scores, names: &PlayerNames) -> String {
    [GameMode::Single, GameMode::Multi]
        .into_iter()
        .map(|mode| {
            let tally = scores.for_mode(mode);
            format!(
                "{:<6} {}: {}  {}: {}",
                mode.to_string(),
                names.name(Mark::X),
                tally.x,
                names.name(Mark::O),
                tally.o
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn render(controller: &GameController) {
    let snapshot = controller.snapshot().await;
    let names = controller.names().await;
    println!("\n{}\n", snapshot.board().display());
    println!("{}", status_message(&snapshot, &names));
}

/// Runs an interactive game on stdin/stdout until the player quits.
#[instrument(skip(controller))]
pub async fn run_terminal(controller: GameController) -> Result<()> {
    info!("Starting terminal session");
    println!("{}", HELP);
    render(&controller).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{} (h for help)", message);
                continue;
            }
        };
        debug!(?command, "Command");

        match command {
            Command::Move(index) => {
                if let Transition::Rejected(err) = controller.make_move(index).await {
                    println!("{}", err);
                    continue;
                }
                controller.wait_for_ai().await;
            }
            Command::Undo => {
                if !controller.undo_move().await {
                    println!("Nothing to undo");
                }
            }
            Command::Reset => controller.reset_game().await,
            Command::Mode(mode) => controller.select_game_mode(mode).await,
            Command::Difficulty(difficulty) => controller.select_difficulty(difficulty).await,
            Command::Mark(mark) => controller.select_player_mark(mark).await,
            Command::Scores => {
                let scores = controller.scores().await;
                println!("{}", format_scores(&scores, &controller.names().await));
                continue;
            }
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Quit => break,
        }
        render(&controller).await;
    }

    info!("Terminal session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("5".parse::<Command>(), Ok(Command::Move(4)));
        assert_eq!("U".parse::<Command>(), Ok(Command::Undo));
        assert_eq!("m multi".parse::<Command>(), Ok(Command::Mode(GameMode::Multi)));
        assert_eq!("d HARD".parse::<Command>(), Ok(Command::Difficulty(Difficulty::Hard)));
        assert_eq!("p o".parse::<Command>(), Ok(Command::Mark(Mark::O)));
        assert!("0".parse::<Command>().is_err());
        assert!("10".parse::<Command>().is_err());
        assert!("d".parse::<Command>().is_err());
    }

    #[test]
    fn test_format_scores_uses_names() {
        let mut scores = Scores::default();
        scores.multi.o = 2;
        let names = PlayerNames {
            x: "Ann".to_string(),
            o: "Bob".to_string(),
        };
        let text = format_scores(&scores, &names);
        assert!(text.contains("multi  Ann: 0  Bob: 2"));
    }
}
