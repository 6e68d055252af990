//! Native Rust TTS backend using the tts crate
//!
//! This backend uses the `tts` crate which provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - WinRT/SAPI on Windows
//!
//! The crate has no pause/resume, so those are logged and ignored here.

use crate::speech::{SpeechEvent, Synth, Utterance, UtteranceId, Voice};
use crate::{Result, SpeechpadError};
use log::{debug, error, warn};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::mpsc::{self, Receiver, Sender};
use tts::Tts as TtsCrate;

/// Slowest multiplier the speed control maps onto the platform minimum
const SLOWEST_MULTIPLIER: f32 = 0.5;

/// Fastest multiplier the speed control maps onto the platform maximum
const FASTEST_MULTIPLIER: f32 = 2.0;

/// What a platform callback reported, keyed by the platform utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Begin(u64),
    End(u64),
}

/// Key for a platform utterance id
///
/// Some platform ids wrap raw object pointers, so only this key crosses
/// the callback threads.
fn platform_key(id: &tts::UtteranceId) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// Which of our utterances each platform utterance belongs to
#[derive(Debug, Default)]
struct UtteranceTracker {
    /// Platform utterances still in flight
    in_flight: HashMap<u64, UtteranceId>,

    /// Utterance submitted without a platform id; claims callbacks whose
    /// key is unknown
    untracked: Option<UtteranceId>,
}

impl UtteranceTracker {
    fn submitted(&mut self, key: Option<u64>, id: UtteranceId) {
        match key {
            Some(key) => {
                self.in_flight.insert(key, id);
                self.untracked = None;
            }
            None => self.untracked = Some(id),
        }
    }

    fn resolve(&mut self, notice: Notice) -> Option<SpeechEvent> {
        match notice {
            Notice::Begin(key) => self
                .in_flight
                .get(&key)
                .copied()
                .or(self.untracked)
                .map(SpeechEvent::Started),
            Notice::End(key) => match self.in_flight.remove(&key) {
                Some(id) => Some(SpeechEvent::Ended(id)),
                None => self.untracked.take().map(SpeechEvent::Ended),
            },
        }
    }

    fn is_empty(&self) -> bool {
        self.in_flight.is_empty() && self.untracked.is_none()
    }
}

/// Native TTS backend using the tts crate
pub struct NativeSynth {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Voices from the last `voices()` call, used to hand a voice back by id
    platform_voices: Vec<tts::Voice>,

    /// Notices sent from the platform callbacks
    notices_rx: Receiver<Notice>,

    /// Whether begin/end callbacks are delivered by the platform
    callbacks: bool,

    /// Utterances reported through callbacks
    tracker: UtteranceTracker,

    /// Utterance whose end is inferred by polling when there are no callbacks
    polled: Option<UtteranceId>,

    /// Events emulated without callbacks, waiting for `poll_events`
    emulated: Vec<SpeechEvent>,

    /// Pause was requested and ignored; warn only once
    warned_pause: bool,
}

impl NativeSynth {
    /// Create a new native TTS synthesizer
    ///
    /// Initializes the platform-appropriate TTS backend and hooks the
    /// utterance callbacks when the platform supports them.
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| SpeechpadError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        let (notices_tx, notices_rx): (Sender<Notice>, Receiver<Notice>) = mpsc::channel();
        let callbacks = tts.supported_features().utterance_callbacks;

        if callbacks {
            let begin_tx = notices_tx.clone();
            let end_tx = notices_tx.clone();
            let stop_tx = notices_tx;

            tts.on_utterance_begin(Some(Box::new(move |id| {
                let _ = begin_tx.send(Notice::Begin(platform_key(&id)));
            })))
            .map_err(|e| SpeechpadError::Speech(format!("Failed to register callback: {}", e)))?;

            tts.on_utterance_end(Some(Box::new(move |id| {
                let _ = end_tx.send(Notice::End(platform_key(&id)));
            })))
            .map_err(|e| SpeechpadError::Speech(format!("Failed to register callback: {}", e)))?;

            tts.on_utterance_stop(Some(Box::new(move |id| {
                let _ = stop_tx.send(Notice::End(platform_key(&id)));
            })))
            .map_err(|e| SpeechpadError::Speech(format!("Failed to register callback: {}", e)))?;
        } else {
            debug!("Utterance callbacks unsupported, emulating lifecycle events");
        }

        debug!("Native TTS backend created successfully");

        Ok(Self {
            tts,
            platform_voices: Vec::new(),
            notices_rx,
            callbacks,
            tracker: UtteranceTracker::default(),
            polled: None,
            emulated: Vec::new(),
            warned_pause: false,
        })
    }

    /// Map a speed multiplier onto the platform's rate range
    ///
    /// 1.0 lands on the platform's normal rate; 0.5 and 2.0 land on its
    /// minimum and maximum, linearly in between.
    fn convert_rate(multiplier: f32, min: f32, normal: f32, max: f32) -> f32 {
        let multiplier = multiplier.clamp(SLOWEST_MULTIPLIER, FASTEST_MULTIPLIER);
        if multiplier >= 1.0 {
            let t = (multiplier - 1.0) / (FASTEST_MULTIPLIER - 1.0);
            normal + (max - normal) * t
        } else {
            let t = (1.0 - multiplier) / (1.0 - SLOWEST_MULTIPLIER);
            normal - (normal - min) * t
        }
    }

    fn apply_rate(&mut self, utterance: &Utterance) -> Result<()> {
        if !self.tts.supported_features().rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let rate = Self::convert_rate(
            utterance.rate_multiplier(),
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        debug!("Setting rate to {} (x{})", rate, utterance.rate);
        self.tts
            .set_rate(rate)
            .map_err(|e| SpeechpadError::Speech(format!("Failed to set rate: {}", e)))?;
        Ok(())
    }

    fn apply_voice(&mut self, utterance: &Utterance) -> Result<()> {
        let Some(voice) = utterance.voice.as_ref() else {
            return Ok(());
        };

        if !self.tts.supported_features().voice {
            warn!("Voice selection not supported on this platform");
            return Ok(());
        }

        match self.platform_voices.iter().find(|v| v.id() == voice.id) {
            Some(platform_voice) => {
                debug!("Selecting voice: {} ({})", voice.name, voice.lang);
                self.tts
                    .set_voice(platform_voice)
                    .map_err(|e| SpeechpadError::Speech(format!("Failed to set voice: {}", e)))?;
            }
            None => warn!("Voice {:?} is no longer available", voice.name),
        }
        Ok(())
    }
}

impl Synth for NativeSynth {
    fn name(&self) -> &'static str {
        "native"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        if !self.tts.supported_features().voice {
            warn!("Voice listing not supported on this platform");
            return Ok(Vec::new());
        }

        self.platform_voices = self
            .tts
            .voices()
            .map_err(|e| SpeechpadError::Speech(format!("Failed to get voices: {}", e)))?;

        Ok(self
            .platform_voices
            .iter()
            .map(|v| Voice::new(v.id(), v.name(), v.language().to_string()))
            .collect())
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        if utterance.text.is_empty() {
            return Ok(());
        }

        self.apply_voice(utterance)?;
        self.apply_rate(utterance)?;

        debug!("Speaking: {}", utterance.text);
        let platform_id = self.tts.speak(utterance.text.as_str(), false).map_err(|e| {
            error!("Failed to speak: {}", e);
            SpeechpadError::Speech(format!("Speak failed: {}", e))
        })?;

        if self.callbacks {
            self.tracker
                .submitted(platform_id.as_ref().map(platform_key), utterance.id);
        } else {
            self.emulated.push(SpeechEvent::Started(utterance.id));
            self.polled = Some(utterance.id);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if !self.warned_pause {
            warn!("Pause not supported by the native backend");
            self.warned_pause = true;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            SpeechpadError::Speech(format!("Cancel failed: {}", e))
        })?;
        Ok(())
    }

    fn is_speaking(&mut self) -> bool {
        if self.tts.supported_features().is_speaking {
            self.tts.is_speaking().unwrap_or(false)
        } else {
            !self.tracker.is_empty() || self.polled.is_some()
        }
    }

    fn supports_pause(&self) -> bool {
        false
    }

    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        let mut events = std::mem::take(&mut self.emulated);

        if !self.callbacks {
            if let Some(id) = self.polled {
                // Without callbacks the end is inferred from is_speaking; with
                // neither, the utterance counts as finished once submitted
                let finished = !self.tts.supported_features().is_speaking
                    || !self.tts.is_speaking().unwrap_or(false);
                if finished {
                    events.push(SpeechEvent::Ended(id));
                    self.polled = None;
                }
            }
            return events;
        }

        let notices: Vec<Notice> = self.notices_rx.try_iter().collect();
        events.extend(notices.into_iter().filter_map(|n| self.tracker.resolve(n)));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_synth() {
        // It may fail if the system doesn't have speech-dispatcher (Linux)
        // or if running in CI without audio
        match NativeSynth::new() {
            Ok(synth) => println!("✓ Native TTS backend initialized: {}", synth.name()),
            Err(e) => println!("⚠ TTS initialization failed (may be expected in CI): {}", e),
        }
    }

    #[test]
    fn test_rate_conversion_speech_dispatcher_range() {
        // Speech Dispatcher: -100..100, normal 0
        assert_eq!(NativeSynth::convert_rate(1.0, -100.0, 0.0, 100.0), 0.0);
        assert_eq!(NativeSynth::convert_rate(2.0, -100.0, 0.0, 100.0), 100.0);
        assert_eq!(NativeSynth::convert_rate(0.5, -100.0, 0.0, 100.0), -100.0);
        assert_eq!(NativeSynth::convert_rate(1.5, -100.0, 0.0, 100.0), 50.0);
    }

    #[test]
    fn test_tracker_maps_platform_ids() {
        let mut tracker = UtteranceTracker::default();
        tracker.submitted(Some(10), UtteranceId(1));
        tracker.submitted(Some(20), UtteranceId(2));

        // The first utterance's end can arrive after the second was submitted
        assert_eq!(
            tracker.resolve(Notice::End(10)),
            Some(SpeechEvent::Ended(UtteranceId(1)))
        );
        assert_eq!(
            tracker.resolve(Notice::Begin(20)),
            Some(SpeechEvent::Started(UtteranceId(2)))
        );
        assert!(!tracker.is_empty());
        assert_eq!(
            tracker.resolve(Notice::End(20)),
            Some(SpeechEvent::Ended(UtteranceId(2)))
        );
        assert!(tracker.is_empty());

        // Notices for utterances we never spoke are dropped
        assert_eq!(tracker.resolve(Notice::End(30)), None);
    }

    #[test]
    fn test_tracker_without_platform_ids() {
        let mut tracker = UtteranceTracker::default();
        tracker.submitted(None, UtteranceId(5));
        assert_eq!(
            tracker.resolve(Notice::Begin(99)),
            Some(SpeechEvent::Started(UtteranceId(5)))
        );
        assert_eq!(
            tracker.resolve(Notice::End(99)),
            Some(SpeechEvent::Ended(UtteranceId(5)))
        );
        assert_eq!(tracker.resolve(Notice::End(99)), None);
    }

    #[test]
    fn test_rate_conversion_clamps() {
        // AVFoundation: 0.1..2.0, normal 0.5
        assert_eq!(NativeSynth::convert_rate(10.0, 0.1, 0.5, 2.0), 2.0);
        assert!((NativeSynth::convert_rate(0.01, 0.1, 0.5, 2.0) - 0.1).abs() < 1e-6);
    }
}
