//! One recorder invocation
//!
//! Each session owns its chunk list, so nothing recorded in one session
//! can leak into the next one's file.

use super::{AudioChunk, CaptureGraph, RecorderState, RecordingConfig, WavSink};
use crate::{Result, SpeechpadError};
use log::{debug, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Recorder bound to a fresh capture graph
pub struct RecordingSession {
    id: u64,
    state: RecorderState,
    chunks: Vec<AudioChunk>,
    graph: CaptureGraph,
    sink: WavSink,
    chunk_interval: Option<Duration>,
    last_pull: Instant,
}

impl RecordingSession {
    /// Build the capture graph and bind a recorder to it (not yet started)
    pub fn open(id: u64, config: &RecordingConfig) -> Self {
        debug!("Opening recording session {}", id);
        Self {
            id,
            state: RecorderState::Inactive,
            chunks: Vec::new(),
            graph: CaptureGraph::new(config.sample_rate),
            sink: WavSink::new(&config.output_dir, &config.file_name, config.sample_rate),
            chunk_interval: config.chunk_interval,
            last_pull: Instant::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Chunks received so far, in arrival order
    pub fn chunks(&self) -> &[AudioChunk] {
        &self.chunks
    }

    /// Begin capturing
    pub fn start(&mut self) -> Result<()> {
        if self.state == RecorderState::Recording {
            return Err(SpeechpadError::Recording(format!(
                "Session {} is already recording",
                self.id
            )));
        }
        self.state = RecorderState::Recording;
        self.last_pull = Instant::now();
        info!("Recording session {} started", self.id);
        Ok(())
    }

    /// Append a chunk of captured audio
    pub fn on_data_available(&mut self, chunk: AudioChunk) {
        if chunk.is_empty() {
            return;
        }
        debug!("Session {}: chunk of {} samples", self.id, chunk.len());
        self.chunks.push(chunk);
    }

    /// Deliver whatever the capture graph produced since the last delivery
    pub fn request_data(&mut self) {
        if self.state != RecorderState::Recording {
            return;
        }
        let now = Instant::now();
        let chunk = self.graph.render(now.duration_since(self.last_pull));
        self.last_pull = now;
        self.on_data_available(chunk);
    }

    /// Periodic delivery when a chunk interval is configured
    pub fn poll(&mut self) {
        if let Some(interval) = self.chunk_interval {
            if self.state == RecorderState::Recording && self.last_pull.elapsed() >= interval {
                self.request_data();
            }
        }
    }

    /// Stop capturing and package every chunk into the output file
    ///
    /// Returns the saved path, or `None` if the session was not recording.
    pub fn stop(&mut self) -> Result<Option<PathBuf>> {
        if self.state == RecorderState::Inactive {
            return Ok(None);
        }
        self.request_data();
        self.state = RecorderState::Inactive;
        info!(
            "Recording session {} stopped with {} chunks",
            self.id,
            self.chunks.len()
        );

        let path = self.sink.save(&self.chunks)?;
        Ok(Some(path))
    }

    /// Stop capturing without writing anything
    pub fn discard(&mut self) {
        if self.state == RecorderState::Recording {
            debug!("Discarding recording session {}", self.id);
        }
        self.state = RecorderState::Inactive;
        self.chunks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> RecordingConfig {
        RecordingConfig {
            output_dir: dir.path().to_path_buf(),
            sample_rate: 8_000,
            ..RecordingConfig::default()
        }
    }

    #[test]
    fn test_stop_saves_chunks_in_order() {
        let dir = TempDir::new().unwrap();
        let mut session = RecordingSession::open(1, &config(&dir));
        session.start().unwrap();
        assert_eq!(session.state(), RecorderState::Recording);

        session.on_data_available(AudioChunk::new(vec![7, 8]));
        session.on_data_available(AudioChunk::new(vec![9]));

        let path = session.stop().unwrap().expect("recording saved");
        assert_eq!(session.state(), RecorderState::Inactive);
        assert_eq!(path.file_name().unwrap(), "speech.wav");

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(&samples[..3], &[7, 8, 9]);
        // Anything after the pushed chunks is the graph's silent tail
        assert!(samples[3..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_stop_when_inactive_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut session = RecordingSession::open(2, &config(&dir));
        assert!(session.stop().unwrap().is_none());

        session.start().unwrap();
        assert!(session.stop().unwrap().is_some());
        assert!(session.stop().unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_start_twice_fails() {
        let dir = TempDir::new().unwrap();
        let mut session = RecordingSession::open(3, &config(&dir));
        session.start().unwrap();
        assert!(session.start().is_err());
    }

    #[test]
    fn test_discard_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut session = RecordingSession::open(4, &config(&dir));
        session.start().unwrap();
        session.on_data_available(AudioChunk::new(vec![1]));
        session.discard();

        assert_eq!(session.state(), RecorderState::Inactive);
        assert!(session.chunks().is_empty());
        assert!(session.stop().unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sessions_do_not_share_chunks() {
        let dir = TempDir::new().unwrap();
        let mut first = RecordingSession::open(5, &config(&dir));
        first.start().unwrap();
        first.on_data_available(AudioChunk::new(vec![1, 1, 1]));

        let second = RecordingSession::open(6, &config(&dir));
        assert!(second.chunks().is_empty());
    }
}
