//! Error types for talkboard

use std::io;
use thiserror::Error;

/// Main error type for talkboard
#[derive(Error, Debug)]
pub enum TalkboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Audio playback error: {0}")]
    Audio(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for talkboard operations
pub type Result<T> = std::result::Result<T, TalkboardError>;

impl From<String> for TalkboardError {
    fn from(s: String) -> Self {
        TalkboardError::Other(s)
    }
}

impl From<&str> for TalkboardError {
    fn from(s: &str) -> Self {
        TalkboardError::Other(s.to_string())
    }
}

impl From<nix::Error> for TalkboardError {
    fn from(e: nix::Error) -> Self {
        TalkboardError::Io(io::Error::from(e))
    }
}
