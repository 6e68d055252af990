//! Configuration loading tests
//!
//! Tests that configuration is created with defaults on first load
//! and that typed accessors read what the file says

use speechpad::config::Config;
use speechpad::speech::BackendPreference;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_created_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".speechpad.cfg");

    let config = Config::load_from(&path).expect("Failed to load config");
    assert!(path.exists(), "Defaults should be written on first load");
    assert_eq!(config.path(), &path);

    assert_eq!(config.backend().unwrap(), BackendPreference::Auto);
    assert_eq!(config.default_lang(), "en-US");
    assert!(!config.select_default_voice());
    assert_eq!(config.rate(), "1");

    let speed = config.speed_control();
    assert_eq!(speed.value(), "1");
    assert_eq!(speed.bounds(), (0.5, 2.0));

    let recording = config.recording();
    assert!(recording.enabled);
    assert_eq!(recording.file_name, "speech.wav");
    assert_eq!(recording.sample_rate, 22_050);
    assert_eq!(recording.chunk_interval, None);
}

#[test]
fn test_config_reads_user_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.cfg");
    std::fs::write(
        &path,
        "[speech]\n\
         backend = espeak\n\
         default_lang = en-GB\n\
         select_default_voice = true\n\
         rate = 1.5\n\
         \n\
         [recording]\n\
         enabled = false\n\
         output_dir = /tmp/speechpad-out\n\
         file_name = reading.wav\n\
         sample_rate = 16000\n\
         chunk_ms = 250\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.backend().unwrap(), BackendPreference::Espeak);
    assert_eq!(config.default_lang(), "en-GB");
    assert!(config.select_default_voice());
    assert_eq!(config.speed_control().label(), "1.5x");

    let recording = config.recording();
    assert!(!recording.enabled);
    assert_eq!(recording.output_dir, std::path::PathBuf::from("/tmp/speechpad-out"));
    assert_eq!(recording.file_name, "reading.wav");
    assert_eq!(recording.sample_rate, 16_000);
    assert_eq!(recording.chunk_interval, Some(Duration::from_millis(250)));
}

#[test]
fn test_config_bad_values_fall_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.cfg");
    std::fs::write(
        &path,
        "[speech]\nbackend = festival\nselect_default_voice = maybe\n\
         [recording]\nsample_rate = -3\nfile_name =\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(config.backend().is_err());
    assert!(!config.select_default_voice());
    assert_eq!(config.sample_rate(), 22_050);
    assert_eq!(config.file_name(), "speech.wav");
}

#[test]
fn test_config_set_and_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".speechpad.cfg");

    let mut config = Config::load_from(&path).unwrap();
    config.set("speech", "default_lang", "fr-FR");
    config.save().unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.default_lang(), "fr-FR");
    assert_eq!(reloaded.get_string("speech", "rate", "?"), "1");
    assert_eq!(reloaded.get_int("recording", "missing", 7), 7);
}
