//! speechpad - terminal text-to-speech pad
//!
//! Speaks typed text through the platform speech synthesizer, lets the user
//! pick a voice and speed while speaking, and saves the session recording
//! as `speech.wav`.

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod platform;
pub mod recorder;
pub mod speech;
pub mod terminal;
pub mod ui;

pub use error::{Result, SpeechpadError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "speechpad";
