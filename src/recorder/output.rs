//! Writing finished recordings to disk

use super::AudioChunk;
use crate::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Default name of a saved recording
pub const DEFAULT_FILE_NAME: &str = "speech.wav";

/// Media type of saved recordings
pub const MIME_TYPE: &str = "audio/wav";

/// Writes recordings as 16-bit mono PCM WAV files
#[derive(Debug, Clone)]
pub struct WavSink {
    dir: PathBuf,
    file_name: String,
    sample_rate: u32,
}

impl WavSink {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            sample_rate,
        }
    }

    /// Concatenate `chunks` in order into one WAV file and return its path
    ///
    /// Never overwrites: if the name is taken, "speech (1).wav",
    /// "speech (2).wav", ... are tried in turn.
    pub fn save(&self, chunks: &[AudioChunk]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = unique_path(&self.dir, &self.file_name);

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec)?;
        let mut frames = 0usize;
        for chunk in chunks {
            for &sample in &chunk.samples {
                writer.write_sample(sample)?;
            }
            frames += chunk.len();
        }
        writer.finalize()?;

        debug!("Wrote {} frames in {} chunks", frames, chunks.len());
        info!("Saved recording ({}) to {}", MIME_TYPE, path.display());
        Ok(path)
    }
}

/// First path in `dir` named `file_name` or "stem (n).ext" that does not exist
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let ext = as_path.extension().map(|e| e.to_string_lossy().into_owned());

    (1u32..)
        .map(|n| match ext.as_deref() {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
