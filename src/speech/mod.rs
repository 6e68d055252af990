//! Speech synthesis system

pub mod backends;
pub mod synth;
pub mod utterance;
pub mod voice;

pub use synth::{create_synth, BackendPreference, SpeechEvent, Synth};
pub use utterance::{Utterance, UtteranceId};
pub use voice::{Voice, VoiceCatalog};
