//! Capture graph feeding a recording session
//!
//! The graph is a context with one destination stream, and a buffer
//! source routed through a gain node into that destination. The source
//! never receives a buffer: synthesized speech goes straight to the audio
//! device and is not routed here. Everything the graph renders, and so
//! everything a saved recording contains, is silence lasting as long as
//! the session.

use super::AudioChunk;
use log::trace;
use std::time::Duration;

/// Capture rate used when none is configured (espeak-ng's native rate)
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Source node with an optional sample buffer
#[derive(Debug, Default)]
struct BufferSource {
    buffer: Option<Vec<i16>>,
    position: usize,
}

impl BufferSource {
    /// Next `frames` samples; past the end of the buffer (or without one)
    /// the source outputs silence
    fn pull(&mut self, frames: usize) -> Vec<i16> {
        let mut out = vec![0i16; frames];
        if let Some(buffer) = self.buffer.as_ref() {
            let available = buffer.len().saturating_sub(self.position).min(frames);
            out[..available].copy_from_slice(&buffer[self.position..self.position + available]);
            self.position += available;
        }
        out
    }
}

/// Gain node
#[derive(Debug)]
struct GainNode {
    gain: f32,
}

impl GainNode {
    fn process(&self, samples: &mut [i16]) {
        if (self.gain - 1.0).abs() < f32::EPSILON {
            return;
        }
        for sample in samples.iter_mut() {
            let scaled = (*sample as f32 * self.gain).round();
            *sample = scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        }
    }
}

/// Audio graph: buffer source → gain → destination stream
#[derive(Debug)]
pub struct CaptureGraph {
    sample_rate: u32,
    source: BufferSource,
    gain: GainNode,
    /// Fractional frames carried between renders so durations add up
    carry: f64,
}

impl CaptureGraph {
    /// Build the graph for a new session
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            source: BufferSource::default(),
            gain: GainNode { gain: 1.0 },
            carry: 0.0,
        }
    }

    /// Render what the destination stream carried during `elapsed`
    pub fn render(&mut self, elapsed: Duration) -> AudioChunk {
        let exact = elapsed.as_secs_f64() * self.sample_rate as f64 + self.carry;
        let frames = exact.floor();
        self.carry = exact - frames;

        let mut samples = self.source.pull(frames as usize);
        self.gain.process(&mut samples);
        trace!("Capture graph rendered {} frames", samples.len());
        AudioChunk::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_silent_for_elapsed_time() {
        let mut graph = CaptureGraph::new(8_000);
        let chunk = graph.render(Duration::from_millis(500));
        assert_eq!(chunk.len(), 4_000);
        assert!(chunk.samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_render_carries_fractional_frames() {
        // 1.5 frames per render
        let mut graph = CaptureGraph::new(2);
        let total: usize = (0..4)
            .map(|_| graph.render(Duration::from_millis(750)).len())
            .sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_gain_scales_and_clamps() {
        let gain = GainNode { gain: 2.0 };
        let mut samples = vec![100, -100, 20_000];
        gain.process(&mut samples);
        assert_eq!(samples, vec![200, -200, i16::MAX]);
    }

    #[test]
    fn test_buffer_source_runs_out_into_silence() {
        let mut source = BufferSource {
            buffer: Some(vec![1, 2, 3]),
            position: 0,
        };
        assert_eq!(source.pull(2), vec![1, 2]);
        assert_eq!(source.pull(3), vec![3, 0, 0]);
    }
}
