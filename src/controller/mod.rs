//! Speech controller
//!
//! Owns everything that changes while the program runs: the surface, the
//! voice catalog, the playback state, the current utterance and the
//! current recording session. All of it is mutated only through the
//! operations below, called from the event loop.
//!
//! Playback cycles Idle → Speaking ⇄ Paused and returns to Idle when the
//! utterance ends or fails.

use crate::recorder::{RecorderState, RecordingConfig, RecordingSession};
use crate::speech::{SpeechEvent, Synth, Utterance, UtteranceId, VoiceCatalog};
use crate::ui::{ButtonLabel, Surface};
use crate::{Result, SpeechpadError};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Speaking,
    Paused,
}

/// Settings the controller needs beyond its collaborators
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Language tag `set_default_voice` looks for
    pub default_lang: String,

    /// Run `set_default_voice` after every catalog load
    pub select_default_voice: bool,

    pub recording: RecordingConfig,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_lang: "en-US".to_string(),
            select_default_voice: false,
            recording: RecordingConfig::default(),
        }
    }
}

/// Wires surface events to the synthesizer and recorder
pub struct SpeechController {
    synth: Box<dyn Synth>,
    catalog: VoiceCatalog,
    surface: Surface,
    state: SpeechState,
    utterance: Option<Utterance>,
    recording: Option<RecordingSession>,
    options: ControllerOptions,

    /// Events raised by the controller itself, handled on the next pump
    deferred: VecDeque<SpeechEvent>,

    next_utterance_id: u64,
    next_session_id: u64,

    /// Set whenever the surface changed and needs a redraw
    dirty: bool,
}

impl SpeechController {
    pub fn new(synth: Box<dyn Synth>, surface: Surface, options: ControllerOptions) -> Self {
        info!("Speech controller using {} backend", synth.name());
        Self {
            synth,
            catalog: VoiceCatalog::new(),
            surface,
            state: SpeechState::Idle,
            utterance: None,
            recording: None,
            options,
            deferred: VecDeque::new(),
            next_utterance_id: 1,
            next_session_id: 1,
            dirty: true,
        }
    }

    /// Load the catalog now, or leave it to the backend's readiness
    /// notifications when it sends them
    pub fn init_voices(&mut self) {
        if self.synth.supports_voice_notifications() {
            debug!("Waiting for voice list notifications");
        } else {
            self.load_voices();
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        self.dirty = true;
        &mut self.surface
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn utterance(&self) -> Option<&Utterance> {
        self.utterance.as_ref()
    }

    pub fn recording(&self) -> Option<&RecordingSession> {
        self.recording.as_ref()
    }

    pub fn backend_name(&self) -> &'static str {
        self.synth.name()
    }

    /// True once after every change to the surface
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ========== Voice Catalog ==========

    /// Fetch voices from the synthesizer and rebuild the selector
    pub fn load_voices(&mut self) {
        let voices = match self.synth.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Failed to load voices: {}", e);
                Vec::new()
            }
        };
        info!("Loaded {} voices", voices.len());

        self.surface.voice_select.set_options(&voices);
        self.catalog.replace(voices);
        self.dirty = true;

        if self.options.select_default_voice {
            self.set_default_voice();
        }
    }

    /// Select the first voice in the default language, if there is one
    pub fn set_default_voice(&mut self) {
        let lang = self.options.default_lang.clone();
        if let Some(voice) = self.catalog.find_by_lang(&lang) {
            debug!("Default voice: {} ({})", voice.name, voice.lang);
            self.surface.voice_select.set_value(&lang);
            self.dirty = true;
        }
    }

    // ========== Selection Controls ==========

    /// Voice selector changed to `value` (a language tag)
    pub fn on_voice_change(&mut self, value: &str) {
        self.surface.voice_select.set_value(value);
        self.dirty = true;

        if let Some(utterance) = self.utterance.as_mut() {
            utterance.voice = self.catalog.find_by_lang(value).cloned();
            if utterance.voice.is_none() {
                debug!("No voice with lang {:?}, utterance voice cleared", value);
            }
        }
    }

    /// Speed control moved to `value`
    pub fn on_speed_input(&mut self, value: &str) {
        self.surface.speed.set_value(value);
        self.dirty = true;

        if let Some(utterance) = self.utterance.as_mut() {
            utterance.rate = value.to_string();
        }
    }

    /// Move the voice selector one option forward or back
    pub fn cycle_voice(&mut self, forward: bool) {
        let Some(next) = self.surface.voice_select.adjacent_index(forward) else {
            return;
        };
        let value = self.surface.voice_select.options()[next].value.clone();
        self.on_voice_change(&value);
        // Keep the cursor on the option the user moved to even when an
        // earlier option has the same language tag
        self.surface.voice_select.select_index(next);
    }

    /// Step the speed control up or down
    pub fn step_speed(&mut self, up: bool) {
        let value = self.surface.speed.stepped_value(up);
        self.on_speed_input(&value);
    }

    // ========== Convert / Pause / Resume ==========

    /// The convert button
    ///
    /// Starts a new utterance when the synthesizer is not speaking, then
    /// always flips between pause and resume.
    pub fn text_to_speech(&mut self) -> Result<()> {
        let text = self.surface.text.value().trim().to_string();
        if text.is_empty() {
            return Err(SpeechpadError::EmptyInputIgnored);
        }

        // Apply events still queued for the previous utterance
        self.pump_events();

        self.surface.loading.show();
        self.dirty = true;

        if !self.synth.is_speaking() {
            self.start_utterance(text)?;
        }

        self.toggle_playback()
    }

    fn start_utterance(&mut self, text: String) -> Result<()> {
        let id = UtteranceId(self.next_utterance_id);
        self.next_utterance_id += 1;

        let mut utterance = Utterance::new(id, text);
        let selected = self.surface.voice_select.value().to_string();
        utterance.voice = self.catalog.resolve(&selected);
        if self.catalog.find_by_lang(&selected).is_none() {
            debug!(
                "Voice resolution miss for {:?}, using {:?}",
                selected,
                utterance.voice.as_ref().map(|v| v.name.as_str())
            );
        }
        utterance.rate = self.surface.speed.value().to_string();

        self.open_recording()?;

        info!("Speaking utterance {:?} ({} chars)", id, utterance.text.len());
        if let Err(e) = self.synth.speak(&utterance) {
            warn!("Synthesizer rejected utterance {:?}: {}", id, e);
            self.deferred.push_back(SpeechEvent::Error(id, e.to_string()));
        }
        self.utterance = Some(utterance);
        Ok(())
    }

    /// Replace the recording session with a fresh, started one
    fn open_recording(&mut self) -> Result<()> {
        if let Some(mut previous) = self.recording.take() {
            previous.discard();
        }
        if !self.options.recording.enabled {
            return Ok(());
        }

        let mut session = RecordingSession::open(self.next_session_id, &self.options.recording);
        self.next_session_id += 1;
        session.start()?;
        self.recording = Some(session);
        Ok(())
    }

    /// Final transition of every convert press
    fn toggle_playback(&mut self) -> Result<()> {
        if self.state == SpeechState::Speaking {
            self.synth.pause()?;
            self.surface.button = ButtonLabel::Resume;
            self.state = SpeechState::Paused;
            if !self.synth.supports_pause() {
                self.surface.status = Some(format!(
                    "The {} backend cannot pause; set backend = espeak in the config",
                    self.synth.name()
                ));
            }
        } else {
            self.synth.resume()?;
            self.surface.button = ButtonLabel::Pause;
            self.state = SpeechState::Speaking;
        }
        self.dirty = true;
        debug!("Playback now {:?}", self.state);
        Ok(())
    }

    // ========== Save ==========

    /// Finish the current recording now and write it out
    ///
    /// Returns `None` when there is no session or it is already inactive.
    pub fn save(&mut self) -> Result<Option<PathBuf>> {
        match self.recording.as_mut() {
            Some(session) if session.state() != RecorderState::Inactive => {
                let saved = session.stop()?;
                self.report_saved(saved.as_ref());
                Ok(saved)
            }
            _ => {
                debug!("Save ignored: no active recording");
                Ok(None)
            }
        }
    }

    fn report_saved(&mut self, saved: Option<&PathBuf>) {
        if let Some(path) = saved {
            self.surface.status = Some(format!("Saved {}", path.display()));
            self.dirty = true;
        }
    }

    // ========== Lifecycle Events ==========

    /// Handle deferred and backend events, and let the recorder pull audio
    pub fn pump_events(&mut self) {
        let mut events: Vec<SpeechEvent> = self.deferred.drain(..).collect();
        events.extend(self.synth.poll_events());

        for event in events {
            self.handle_event(event);
        }

        if let Some(session) = self.recording.as_mut() {
            session.poll();
        }
    }

    /// Whether `id` is the utterance currently owned by the controller
    fn is_current(&self, id: UtteranceId) -> bool {
        self.utterance.as_ref().map(|u| u.id) == Some(id)
    }

    /// Apply one lifecycle event
    ///
    /// Utterance events for anything but the current utterance are stale
    /// and ignored.
    pub fn handle_event(&mut self, event: SpeechEvent) {
        debug!("Speech event: {:?}", event);
        match event {
            SpeechEvent::Started(id)
            | SpeechEvent::Ended(id)
            | SpeechEvent::Error(id, _)
                if !self.is_current(id) =>
            {
                debug!("Ignoring event for stale utterance {:?}", id);
                return;
            }
            SpeechEvent::Started(_) => {
                self.state = SpeechState::Speaking;
                self.surface.button = ButtonLabel::Pause;
            }
            SpeechEvent::Ended(_) => {
                self.state = SpeechState::Idle;
                self.surface.loading.hide();
                self.surface.button = ButtonLabel::Convert;
                self.utterance = None;
                self.finish_recording();
            }
            SpeechEvent::Error(_, message) => {
                warn!("Speech synthesis error: {}", message);
                self.surface.loading.hide();
                self.surface.button = ButtonLabel::Convert;
                self.state = SpeechState::Idle;
                self.utterance = None;
                if let Some(session) = self.recording.as_mut() {
                    session.discard();
                }
            }
            SpeechEvent::VoicesChanged => self.load_voices(),
        }
        self.dirty = true;
    }

    /// Stop the session at the natural end of its utterance and save it
    fn finish_recording(&mut self) {
        let Some(session) = self.recording.as_mut() else {
            return;
        };
        match session.stop() {
            Ok(saved) => self.report_saved(saved.as_ref()),
            Err(e) => {
                error!("Failed to save recording: {}", e);
                self.surface.status = Some(format!("Recording not saved: {}", e));
            }
        }
    }

    /// Silence the synthesizer, e.g. before exit
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(session) = self.recording.as_mut() {
            session.discard();
        }
        self.synth.cancel()
    }
}
