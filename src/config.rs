//! Engine configuration loaded from TOML.

use crate::session::{GameMode, SessionSettings};
use derive_getters::Getters;
use derive_more::{Display, Error};
use noughts_core::{Difficulty, Mark};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime options for the engine and its front end.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause before the AI answers, in milliseconds.
    #[serde(default = "default_ai_delay_ms")]
    ai_delay_ms: u64,

    /// Game mode for new sessions.
    #[serde(default)]
    mode: GameMode,

    /// AI strength.
    #[serde(default)]
    difficulty: Difficulty,

    /// The human's mark in single-player mode.
    #[serde(default = "default_human_mark")]
    human_mark: Mark,

    /// SQLite database file.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Fixed RNG seed for reproducible AI play.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_ai_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_human_mark() -> Mark {
    Mark::X
}

#[instrument]
fn default_db_path() -> String {
    "noughts.db".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ai_delay_ms: default_ai_delay_ms(),
            mode: GameMode::default(),
            difficulty: Difficulty::default(),
            human_mark: default_human_mark(),
            db_path: default_db_path(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(mode = %config.mode, difficulty = %config.difficulty, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid config TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// AI pacing delay.
    pub fn ai_delay(&self) -> Duration {
        Duration::from_millis(self.ai_delay_ms)
    }

    /// Settings for a new session.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            mode: self.mode,
            difficulty: self.difficulty,
            human_mark: self.human_mark,
        }
    }

    /// Applies command-line overrides; `None` keeps the configured value.
    #[instrument(skip(self))]
    pub fn override_with(
        mut self,
        mode: Option<GameMode>,
        difficulty: Option<Difficulty>,
        human_mark: Option<Mark>,
        db_path: Option<String>,
    ) -> Self {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        if let Some(difficulty) = difficulty {
            self.difficulty = difficulty;
        }
        if let Some(mark) = human_mark {
            self.human_mark = mark;
        }
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml("").expect("empty config is valid");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.ai_delay(), Duration::from_millis(500));
        assert_eq!(*config.difficulty(), Difficulty::Medium);
        assert_eq!(config.db_path(), "noughts.db");
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml(
            r#"
            mode = "multi"
            difficulty = "hard"
            human_mark = "O"
            seed = 17
            "#,
        )
        .expect("valid config");
        assert_eq!(*config.mode(), GameMode::Multi);
        assert_eq!(*config.difficulty(), Difficulty::Hard);
        assert_eq!(*config.human_mark(), Mark::O);
        assert_eq!(*config.seed(), Some(17));
        assert_eq!(*config.ai_delay_ms(), 500);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let err = EngineConfig::from_toml("difficulty = \"impossible\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default().override_with(
            None,
            Some(Difficulty::Easy),
            Some(Mark::O),
            Some("other.db".to_string()),
        );
        assert_eq!(*config.mode(), GameMode::Single);
        assert_eq!(*config.difficulty(), Difficulty::Easy);
        assert_eq!(config.session_settings().human_mark, Mark::O);
        assert_eq!(config.db_path(), "other.db");
    }

    #[test]
    fn test_missing_file() {
        assert!(EngineConfig::from_file("/definitely/not/here.toml").is_err());
    }
}
