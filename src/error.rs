//! Error types for Crew Commander.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A token matched nothing in the vocabulary.
    #[error("Unknown command: '{token}'\n{hint}")]
    UnknownCommand { token: String, hint: String },

    /// A token matched more than one vocabulary entry.
    #[error("Ambiguous command: '{token}' could be: {}\n{hint}", .candidates.join(", "))]
    AmbiguousCommand {
        token: String,
        candidates: Vec<String>,
        hint: String,
    },

    /// Resolved command sequence matched no registered pattern.
    #[error("Invalid command sequence: {0}\nUse 'crew help' for valid command patterns")]
    InvalidChain(String),

    #[error("No active session for {0}\nStart one first: crew session start {0}")]
    NoActiveSession(String),

    #[error("Invalid identity: '{0}'\nValid identities: cl1 (claude-1), cl2 (claude-2), ai1 (aider-1), ai2 (aider-2)")]
    InvalidIdentity(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A structurally valid invocation with unusable arguments.
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tmux error: {0}")]
    Tmux(String),

    #[error("Exec error: {0}")]
    Exec(String),
}
