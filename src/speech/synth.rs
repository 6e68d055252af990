//! Speech synthesizer abstraction
//!
//! Provides a unified interface for text-to-speech across platforms.
//! The controller drives every backend through this trait and learns about
//! utterance progress by polling `SpeechEvent`s.

use super::utterance::{Utterance, UtteranceId};
use super::voice::Voice;
use crate::platform::Platform;
use crate::{Result, SpeechpadError};
use log::info;
use std::str::FromStr;

/// Lifecycle notifications from a backend
///
/// Every utterance event names the utterance it belongs to, so an event
/// still queued for a finished utterance cannot act on the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The utterance started playing
    Started(UtteranceId),
    /// The utterance finished (or was stopped)
    Ended(UtteranceId),
    /// The utterance failed
    Error(UtteranceId, String),
    /// The set of available voices changed
    VoicesChanged,
}

/// Speech synthesizer trait
///
/// All backends implement this to provide text-to-speech.
pub trait Synth: Send {
    /// Short backend name for logs and the status line
    fn name(&self) -> &'static str;

    /// List the voices this backend can speak with
    fn voices(&mut self) -> Result<Vec<Voice>>;

    /// Start speaking an utterance
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;

    /// Pause the current utterance
    fn pause(&mut self) -> Result<()>;

    /// Resume a paused utterance
    fn resume(&mut self) -> Result<()>;

    /// Cancel/silence current speech
    fn cancel(&mut self) -> Result<()>;

    /// True while an utterance is playing or paused
    fn is_speaking(&mut self) -> bool;

    /// Drain lifecycle events that happened since the last call
    fn poll_events(&mut self) -> Vec<SpeechEvent>;

    /// Whether `pause` actually holds playback
    fn supports_pause(&self) -> bool {
        true
    }

    /// Whether the backend announces voice list changes with
    /// `SpeechEvent::VoicesChanged`
    fn supports_voice_notifications(&self) -> bool {
        false
    }
}

/// Which backend `create_synth` should use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendPreference {
    Auto,
    Native,
    Espeak,
}

impl FromStr for BackendPreference {
    type Err = SpeechpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "native" | "tts" => Ok(Self::Native),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            other => Err(SpeechpadError::Config(format!(
                "Unknown speech backend '{}' (expected auto, native or espeak)",
                other
            ))),
        }
    }
}

fn try_native() -> Result<Box<dyn Synth>> {
    use super::backends::native::NativeSynth;

    info!("Trying native TTS backend...");
    let synth = NativeSynth::new()?;
    info!("✓ Successfully initialized native TTS backend");
    Ok(Box::new(synth))
}

fn try_espeak() -> Result<Box<dyn Synth>> {
    use super::backends::espeak::EspeakSynth;

    info!("Trying espeak-ng backend...");
    let synth = EspeakSynth::new()?;
    info!("✓ Successfully initialized espeak-ng backend");
    Ok(Box::new(synth))
}

/// Create a platform-appropriate speech synthesizer
///
/// With `BackendPreference::Auto`:
///
/// **WSL:** espeak-ng through WSLg PulseAudio, then the native backend.
///
/// **Native Linux:** Speech Dispatcher via the tts crate, then espeak-ng.
///
/// **macOS and others:** the tts crate's native backend.
pub fn create_synth(preference: BackendPreference) -> Result<Box<dyn Synth>> {
    match preference {
        BackendPreference::Native => return try_native(),
        BackendPreference::Espeak => return try_espeak(),
        BackendPreference::Auto => {}
    }

    let platform = Platform::detect();

    if platform == Platform::Wsl {
        info!("Detected WSL environment");

        match try_espeak() {
            Ok(synth) => return Ok(synth),
            Err(e) => info!("✗ espeak-ng backend unavailable: {}", e),
        }

        return try_native().map_err(|e| {
            SpeechpadError::Speech(format!(
                "No speech backend available on WSL. Tried:\n\
                 1. espeak-ng (install: sudo apt install espeak-ng)\n\
                 2. Speech Dispatcher (not configured)\n\
                 Error: {}",
                e
            ))
        });
    }

    if platform == Platform::Linux {
        info!("Detected native Linux environment");

        match try_native() {
            Ok(synth) => return Ok(synth),
            Err(e) => {
                info!("✗ Speech Dispatcher unavailable: {}", e);
                info!("To install: sudo apt install speech-dispatcher");
            }
        }

        return try_espeak().map_err(|e| {
            SpeechpadError::Speech(format!(
                "No speech backend available on Linux. Tried:\n\
                 1. Speech Dispatcher (install: sudo apt install speech-dispatcher)\n\
                 2. espeak-ng (install: sudo apt install espeak-ng)\n\
                 Error: {}",
                e
            ))
        });
    }

    info!("Creating native speech synthesizer for platform: {:?}", platform);
    try_native().map_err(|e| {
        SpeechpadError::Speech(format!(
            "Failed to initialize speech backend for platform {:?}: {}",
            platform, e
        ))
    })
}
