//! Noughts - terminal tic-tac-toe
//!
//! Plays against a minimax opponent or a second human and keeps score.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use noughts::{EngineConfig, GameController, LogFeedback, Persistence, SqliteBackend, format_scores};
use noughts_core::Mark;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let (mode, difficulty, mark) = match &cli.command {
        Some(Command::Play {
            mode,
            difficulty,
            mark,
        }) => (*mode, *difficulty, *mark),
        _ => (None, None, None),
    };
    let config = load_config(&cli.config)?.override_with(mode, difficulty, mark, cli.db_path.clone());
    let persistence = open_persistence(config.db_path());
    let controller = GameController::from_config(&config, persistence, Arc::new(LogFeedback));

    match cli.command {
        None | Some(Command::Play { .. }) => noughts::run_terminal(controller).await?,
        Some(Command::Scores) => {
            let scores = controller.scores().await;
            println!("{}", format_scores(&scores, &controller.names().await));
        }
        Some(Command::History) => {
            let history = controller.history().await;
            if history.is_empty() {
                println!("No games played yet");
            }
            for (number, entry) in history.iter().enumerate() {
                println!(
                    "{:>3}. {}  {:<6} {} vs {}  {} ({} moves)",
                    number + 1,
                    entry.completed_at().format("%Y-%m-%d %H:%M"),
                    entry.mode().to_string(),
                    entry.names().name(Mark::X),
                    entry.names().name(Mark::O),
                    entry.outcome(),
                    entry.moves().len()
                );
            }
        }
        Some(Command::DeleteHistory { number }) => {
            let removed = match number.checked_sub(1) {
                Some(index) => controller.delete_history_entry(index).await,
                None => None,
            };
            match removed {
                Some(entry) => println!("Deleted game {} ({})", number, entry.outcome()),
                None => println!("No game numbered {}", number),
            }
        }
        Some(Command::ResetScores) => {
            controller.reset_scores().await;
            println!("Scores reset");
        }
        Some(Command::Names { x, o }) => {
            if let Some(name) = x {
                controller.set_player_name(Mark::X, name).await;
            }
            if let Some(name) = o {
                controller.set_player_name(Mark::O, name).await;
            }
            let names = controller.names().await;
            println!("X: {}\nO: {}", names.x, names.o);
        }
        Some(Command::Sound { state }) => {
            if let Some(state) = state {
                controller.set_sound_enabled(state.enabled()).await;
            }
            let enabled = controller.sound_enabled().await;
            println!("Sound {}", if enabled { "on" } else { "off" });
        }
    }

    Ok(())
}

#[instrument(skip(path), fields(path = %path.display()))]
fn load_config(path: &Path) -> Result<EngineConfig> {
    if path.exists() {
        Ok(EngineConfig::from_file(path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(EngineConfig::default())
    }
}

#[instrument]
fn open_persistence(db_path: &str) -> Persistence {
    match SqliteBackend::open(db_path) {
        Ok(backend) => Persistence::new(backend),
        Err(err) => {
            warn!(error = %err, "Database unavailable, scores will not be saved");
            Persistence::in_memory()
        }
    }
}

fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}
