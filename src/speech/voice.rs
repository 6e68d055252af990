//! Voice catalog
//!
//! Voices are keyed by language tag throughout the UI: the selector's value
//! is a voice's `lang`, and lookups return the first voice with that tag.
//! Two voices sharing a tag are therefore indistinguishable to the selector.

use log::debug;
use serde::Serialize;

/// A synthesis voice offered by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voice {
    /// Backend-specific identifier (used to hand the voice back to the backend)
    pub id: String,

    /// Display label
    pub name: String,

    /// Language tag, e.g. "en-US"
    pub lang: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Ordered list of voices from the last catalog load
#[derive(Debug, Default, Clone)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole catalog
    pub fn replace(&mut self, voices: Vec<Voice>) {
        debug!("Voice catalog replaced: {} voices", voices.len());
        self.voices = voices;
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// First voice whose language tag equals `lang`
    pub fn find_by_lang(&self, lang: &str) -> Option<&Voice> {
        self.voices.iter().find(|voice| voice.lang == lang)
    }

    /// First voice in catalog order
    pub fn first(&self) -> Option<&Voice> {
        self.voices.first()
    }

    /// Voice for a new utterance: the selected language, else the first
    /// voice, else none at all
    pub fn resolve(&self, lang: &str) -> Option<Voice> {
        match self.find_by_lang(lang) {
            Some(voice) => Some(voice.clone()),
            None => {
                debug!("No voice with lang {:?}, falling back to first voice", lang);
                self.first().cloned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceCatalog {
        let mut catalog = VoiceCatalog::new();
        catalog.replace(vec![
            Voice::new("1", "Daniel", "en-GB"),
            Voice::new("2", "Samantha", "en-US"),
            Voice::new("3", "Alex", "en-US"),
        ]);
        catalog
    }

    #[test]
    fn test_find_by_lang_returns_first_match() {
        let catalog = catalog();
        assert_eq!(catalog.find_by_lang("en-US").unwrap().name, "Samantha");
        assert!(catalog.find_by_lang("fr-FR").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_first() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("fr-FR").unwrap().name, "Daniel");
        assert_eq!(catalog.resolve("en-US").unwrap().id, "2");
    }

    #[test]
    fn test_resolve_empty_catalog() {
        let catalog = VoiceCatalog::new();
        assert!(catalog.resolve("en-US").is_none());
        assert!(catalog.is_empty());
    }
}
