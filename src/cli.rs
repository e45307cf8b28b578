//! Command-line interface for noughts.

use clap::{Parser, Subcommand, ValueEnum};
use noughts_core::{Difficulty, Mark};
use noughts::GameMode;

/// Noughts - tic-tac-toe against a minimax opponent
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Play tic-tac-toe in the terminal and keep score", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (used if it exists)
    #[arg(short, long, default_value = "noughts.toml")]
    pub config: std::path::PathBuf,

    /// Path to the database file (overrides the config)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game
    Play {
        /// Game mode: single or multi
        #[arg(short, long)]
        mode: Option<GameMode>,

        /// AI difficulty: easy, medium or hard
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Your mark in single-player mode: X or O
        #[arg(long)]
        mark: Option<Mark>,
    },

    /// Show score tallies
    Scores,

    /// List completed games, oldest first
    History,

    /// Delete a completed game by its number in `history`
    DeleteHistory {
        /// Entry number as listed by `history` (starting at 1)
        number: usize,
    },

    /// Zero both modes' tallies, keeping history
    ResetScores,

    /// Show or change player names
    Names {
        /// New name for X
        #[arg(long)]
        x: Option<String>,

        /// New name for O
        #[arg(long)]
        o: Option<String>,
    },

    /// Show or change the sound preference
    Sound {
        /// Turn sound on or off
        state: Option<Toggle>,
    },
}

/// On/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    /// Enabled
    On,
    /// Disabled
    Off,
}

impl Toggle {
    /// True for [`Toggle::On`].
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
