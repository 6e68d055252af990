//! Recording of speech sessions
//!
//! A `RecordingSession` accumulates audio chunks from its capture graph
//! between `start` and `stop`, then packages them into one WAV file
//! through a `WavSink`.

pub mod capture;
pub mod output;
pub mod session;

pub use capture::CaptureGraph;
pub use output::WavSink;
pub use session::RecordingSession;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Recorder status, as reported by `RecordingSession::state`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Inactive,
    Recording,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderState::Inactive => write!(f, "inactive"),
            RecorderState::Recording => write!(f, "recording"),
        }
    }
}

/// One block of 16-bit mono samples
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
}

impl AudioChunk {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Settings for opening recording sessions
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Record at all; when false no session is opened
    pub enabled: bool,

    /// Directory the finished recording is written to
    pub output_dir: PathBuf,

    /// File name of the finished recording, e.g. "speech.wav"
    pub file_name: String,

    /// Capture sample rate in Hz
    pub sample_rate: u32,

    /// Deliver chunks periodically instead of once at stop
    pub chunk_interval: Option<Duration>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("."),
            file_name: output::DEFAULT_FILE_NAME.to_string(),
            sample_rate: capture::DEFAULT_SAMPLE_RATE,
            chunk_interval: None,
        }
    }
}
