//! espeak-ng backend
//!
//! Speaks each utterance with its own `espeak-ng` process. Pausing stops
//! the process with SIGSTOP and resuming continues it with SIGCONT, which
//! gives real pause/resume where the tts crate has none.
//!
//! On WSL the audio goes through the WSLg PulseAudio server at
//! /mnt/wslg/PulseServer.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::platform::is_wsl;
use crate::speech::{SpeechEvent, Synth, Utterance, UtteranceId, Voice};
use crate::{Result, SpeechpadError};
use log::{debug, error, info, warn};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::{Child, Command, Stdio};

/// espeak-ng's default speed in words per minute
const NORMAL_WPM: f32 = 175.0;
const MIN_WPM: f32 = 80.0;
const MAX_WPM: f32 = 450.0;

/// espeak-ng backend
pub struct EspeakSynth {
    /// Currently running espeak-ng process and the utterance it speaks
    current_process: Option<(Child, UtteranceId)>,

    /// Events waiting for the next `poll_events`
    pending: Vec<SpeechEvent>,

    /// Path to espeak-ng
    espeak_path: String,
}

impl EspeakSynth {
    /// Setup PulseAudio server environment
    ///
    /// Auto-detects WSLG PulseAudio server and sets PULSE_SERVER if needed.
    fn setup_pulseaudio() -> Result<()> {
        const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

        if std::env::var("PULSE_SERVER").is_ok() {
            debug!("PULSE_SERVER already set via environment");
            return Ok(());
        }

        if std::path::Path::new(WSLG_PULSE_PATH).exists() {
            info!("Auto-detected WSLG PulseAudio server at {}", WSLG_PULSE_PATH);
            std::env::set_var("PULSE_SERVER", WSLG_PULSE_PATH);
            return Ok(());
        }

        if is_wsl() {
            warn!("WSLG PulseAudio server not found at {}", WSLG_PULSE_PATH);
            warn!("Make sure WSLg is installed and running, or set PULSE_SERVER");
            return Err(SpeechpadError::Speech(
                "PulseAudio server not found. Install WSLg or set PULSE_SERVER environment variable."
                    .to_string(),
            ));
        }

        // Elsewhere espeak-ng uses the default audio output
        Ok(())
    }

    /// Create a new espeak-ng synthesizer
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        Self::setup_pulseaudio()?;

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            current_process: None,
            pending: Vec::new(),
            espeak_path,
        })
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng", "/usr/local/bin/espeak-ng"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(SpeechpadError::Speech(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Convert a speed multiplier to espeak-ng words per minute
    fn rate_to_wpm(multiplier: f32) -> u16 {
        (NORMAL_WPM * multiplier).clamp(MIN_WPM, MAX_WPM).round() as u16
    }

    /// Turn espeak's lowercase tags ("en-us") into BCP 47 casing ("en-US")
    fn normalize_lang(tag: &str) -> String {
        tag.split('-')
            .enumerate()
            .map(|(i, part)| {
                if i == 0 {
                    part.to_ascii_lowercase()
                } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                    part.to_ascii_uppercase()
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Parse the table printed by `espeak-ng --voices`
    ///
    /// ```text
    /// Pty Language       Age/Gender VoiceName          File          Other Languages
    ///  5  en-us           --/M      English_(America)  gmw/en-US     (en 10)
    /// ```
    fn parse_voices(listing: &str) -> Vec<Voice> {
        listing
            .lines()
            .skip(1)
            .filter_map(|line| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 4 {
                    return None;
                }
                let tag = fields[1];
                let name = fields[3].replace('_', " ");
                Some(Voice::new(tag, name, Self::normalize_lang(tag)))
            })
            .collect()
    }

    fn signal_process(&self, sig: Signal) -> Result<()> {
        if let Some((child, _)) = self.current_process.as_ref() {
            let pid = Pid::from_raw(child.id() as i32);
            debug!("Sending {:?} to espeak-ng ({})", sig, pid);
            signal::kill(pid, sig).map_err(|e| {
                SpeechpadError::Speech(format!("Failed to signal espeak-ng: {}", e))
            })?;
        }
        Ok(())
    }

    /// Cancel any currently running speech process
    fn cancel_process(&mut self) {
        if let Some((mut child, id)) = self.current_process.take() {
            debug!("Killing espeak-ng process for {:?}", id);
            match child.kill() {
                Ok(_) => {
                    let _ = child.wait(); // Clean up zombie
                }
                Err(e) => {
                    debug!("Failed to kill espeak-ng process: {}", e);
                }
            }
        }
    }
}

impl Synth for EspeakSynth {
    fn name(&self) -> &'static str {
        "espeak-ng"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.espeak_path)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(SpeechpadError::Speech(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }

        let listing = String::from_utf8(output.stdout)?;
        let voices = Self::parse_voices(&listing);
        debug!("espeak-ng reports {} voices", voices.len());
        Ok(voices)
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        if utterance.text.is_empty() {
            return Ok(());
        }

        self.cancel_process();

        let wpm = Self::rate_to_wpm(utterance.rate_multiplier());

        let mut cmd = Command::new(&self.espeak_path);
        if let Some(voice) = utterance.voice.as_ref() {
            cmd.arg("-v").arg(&voice.id);
        }
        cmd.arg("-s").arg(wpm.to_string());
        // "--" keeps text starting with a dash from being read as a flag
        cmd.arg("--").arg(&utterance.text);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        debug!("Speaking at {} wpm: {}", wpm, utterance.text);
        match cmd.spawn() {
            Ok(child) => {
                self.current_process = Some((child, utterance.id));
                self.pending.push(SpeechEvent::Started(utterance.id));
                Ok(())
            }
            Err(e) => {
                error!("Failed to spawn espeak-ng: {}", e);
                Err(SpeechpadError::Speech(format!("Failed to start espeak-ng: {}", e)))
            }
        }
    }

    fn pause(&mut self) -> Result<()> {
        self.signal_process(Signal::SIGSTOP)
    }

    fn resume(&mut self) -> Result<()> {
        self.signal_process(Signal::SIGCONT)
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.cancel_process();
        Ok(())
    }

    fn is_speaking(&mut self) -> bool {
        match self.current_process.as_mut() {
            Some((child, _)) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        let finished = match self.current_process.as_mut() {
            Some((child, id)) => match child.try_wait() {
                Ok(Some(status)) => Some(if status.success() {
                    SpeechEvent::Ended(*id)
                } else {
                    SpeechEvent::Error(*id, format!("espeak-ng exited with {}", status))
                }),
                Ok(None) => None,
                Err(e) => Some(SpeechEvent::Error(
                    *id,
                    format!("Failed to wait for espeak-ng: {}", e),
                )),
            },
            None => None,
        };

        if let Some(event) = finished {
            debug!("espeak-ng finished: {:?}", event);
            self.current_process = None;
            self.pending.push(event);
        }

        std::mem::take(&mut self.pending)
    }
}

impl Drop for EspeakSynth {
    fn drop(&mut self) {
        debug!("Shutting down espeak-ng backend");
        self.cancel_process();
    }
}
