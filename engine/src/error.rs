// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

use crate::state::GameState;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a command was rejected. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("SpellingError: unrecognized command '{token}'")]
    Spelling { token: String },

    #[error("StateError: '{command}' is not valid in state {state}; valid commands: {}", .valid.join(", "))]
    State {
        command: String,
        state: GameState,
        valid: Vec<&'static str>,
    },

    #[error("ERROR: {0}")]
    Action(String),
}

impl CommandError {
    pub fn action(message: impl Into<String>) -> Self {
        CommandError::Action(message.into())
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("map has no [{0}] section")]
    MissingSection(&'static str),

    #[error("territory '{territory}' refers to unknown continent {continent}")]
    UnknownContinent { territory: String, continent: usize },

    #[error("border line refers to unknown territory {0}")]
    UnknownTerritory(usize),

    #[error("map contains no territories")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
