//! Configuration management

use crate::recorder::{output::DEFAULT_FILE_NAME, RecordingConfig};
use crate::speech::BackendPreference;
use crate::ui::SpeedControl;
use crate::{Result, SpeechpadError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
///
/// Persistent settings for the synthesizer backend, the default voice, the
/// speed control and saved recordings.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.speechpad.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from ~/.speechpad.cfg, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, writing the defaults there if the
    /// file does not exist yet
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| SpeechpadError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| SpeechpadError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| SpeechpadError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".speechpad.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("backend", "auto")
            .set("default_lang", "en-US")
            .set("select_default_voice", "false")
            .set("rate", "1")
            .set("speed_min", "0.5")
            .set("speed_max", "2")
            .set("speed_step", "0.1");

        // Empty output_dir means the user's download directory
        ini.with_section(Some("recording"))
            .set("enabled", "true")
            .set("output_dir", "")
            .set("file_name", DEFAULT_FILE_NAME)
            .set("sample_rate", "22050")
            .set("chunk_ms", "0");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f64) -> f64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Which synthesizer backend to use
    pub fn backend(&self) -> Result<BackendPreference> {
        self.get_string("speech", "backend", "auto").parse()
    }

    /// Language tag of the voice Alt+d selects
    pub fn default_lang(&self) -> String {
        self.get_string("speech", "default_lang", "en-US")
    }

    /// Select the default voice after every catalog load
    pub fn select_default_voice(&self) -> bool {
        self.get_bool("speech", "select_default_voice", false)
    }

    /// Initial speed control value
    pub fn rate(&self) -> String {
        self.get_string("speech", "rate", "1")
    }

    /// Speed control with the configured bounds and step
    pub fn speed_control(&self) -> SpeedControl {
        let min = self.get_float("speech", "speed_min", 0.5);
        let max = self.get_float("speech", "speed_max", 2.0).max(min);
        let step = self.get_float("speech", "speed_step", 0.1);
        let step = if step > 0.0 { step } else { 0.1 };
        SpeedControl::new(self.rate(), min, max, step)
    }

    /// Whether convert opens a recording session
    pub fn recording_enabled(&self) -> bool {
        self.get_bool("recording", "enabled", true)
    }

    /// Where saved recordings go: the configured directory, else the
    /// download directory, else home, else the working directory
    pub fn output_dir(&self) -> PathBuf {
        let configured = self.get_string("recording", "output_dir", "");
        if !configured.trim().is_empty() {
            return PathBuf::from(configured.trim());
        }
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// File name for saved recordings
    pub fn file_name(&self) -> String {
        let name = self.get_string("recording", "file_name", DEFAULT_FILE_NAME);
        if name.trim().is_empty() {
            DEFAULT_FILE_NAME.to_string()
        } else {
            name
        }
    }

    /// Capture sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.get_int("recording", "sample_rate", 22_050)
            .try_into()
            .ok()
            .filter(|&r: &u32| r > 0)
            .unwrap_or(22_050)
    }

    /// Periodic chunk delivery; 0 delivers a single chunk at stop
    pub fn chunk_interval(&self) -> Option<Duration> {
        match self.get_int("recording", "chunk_ms", 0) {
            ms if ms > 0 => Some(Duration::from_millis(ms as u64)),
            _ => None,
        }
    }

    /// Recording settings for the controller
    pub fn recording(&self) -> RecordingConfig {
        RecordingConfig {
            enabled: self.recording_enabled(),
            output_dir: self.output_dir(),
            file_name: self.file_name(),
            sample_rate: self.sample_rate(),
            chunk_interval: self.chunk_interval(),
        }
    }
}
