//! Error types for speechpad

use std::io;
use thiserror::Error;

/// Main error type for speechpad
#[derive(Error, Debug)]
pub enum SpeechpadError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Convert was pressed with nothing but whitespace in the text field.
    /// Never shown to the user.
    #[error("Empty input ignored")]
    EmptyInputIgnored,
}

/// Result type alias for speechpad operations
pub type Result<T> = std::result::Result<T, SpeechpadError>;
