//! Platform-specific speech backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

// espeak-ng child process backend (pausable, works through WSLg PulseAudio)
pub mod espeak;
