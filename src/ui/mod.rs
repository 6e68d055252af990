//! UI surface
//!
//! Plain widget state that the controller mutates and `render` draws:
//! the text field, the convert button, the voice selector, the speed
//! control, the loading indicator and a status line.

pub mod render;

use crate::speech::Voice;
use std::fmt;

/// Text the user typed
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    value: String,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.value = text.into();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.value.push_str(text);
    }

    /// Remove the last character
    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}

/// Label on the convert button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonLabel {
    #[default]
    Convert,
    Pause,
    Resume,
}

impl fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonLabel::Convert => write!(f, "Convert to Speech"),
            ButtonLabel::Pause => write!(f, "Pause"),
            ButtonLabel::Resume => write!(f, "Resume"),
        }
    }
}

/// One entry of the voice selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOption {
    pub value: String,
    pub label: String,
}

/// Drop-down of voices, valued by language tag
///
/// Behaves like an HTML select: rebuilding the options selects the first
/// one, and setting a value no option has leaves nothing selected.
#[derive(Debug, Default, Clone)]
pub struct VoiceSelect {
    options: Vec<VoiceOption>,
    selected: Option<usize>,
}

impl VoiceSelect {
    /// Replace every option with one per voice
    pub fn set_options(&mut self, voices: &[Voice]) {
        self.options = voices
            .iter()
            .map(|voice| VoiceOption {
                value: voice.lang.clone(),
                label: voice.name.clone(),
            })
            .collect();
        self.selected = if self.options.is_empty() { None } else { Some(0) };
    }

    pub fn options(&self) -> &[VoiceOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&VoiceOption> {
        self.selected.and_then(|i| self.options.get(i))
    }

    /// Value of the selected option, or "" when nothing is selected
    pub fn value(&self) -> &str {
        self.selected().map(|o| o.value.as_str()).unwrap_or("")
    }

    /// Select the first option with `value`
    pub fn set_value(&mut self, value: &str) {
        self.selected = self.options.iter().position(|o| o.value == value);
    }

    /// Index of the option after (or before) the selected one, wrapping
    pub fn adjacent_index(&self, forward: bool) -> Option<usize> {
        let len = self.options.len();
        if len == 0 {
            return None;
        }
        Some(match (self.selected, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        })
    }

    /// Select by index, used when several options share a value
    pub fn select_index(&mut self, index: usize) {
        if index < self.options.len() {
            self.selected = Some(index);
        }
    }
}

/// Speed slider with its "{value}x" label
#[derive(Debug, Clone)]
pub struct SpeedControl {
    value: String,
    min: f64,
    max: f64,
    step: f64,
}

impl SpeedControl {
    pub fn new(value: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self {
            value: value.into(),
            min,
            max,
            step,
        }
    }

    /// Raw value, as the slider reports it
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn label(&self) -> String {
        format!("{}x", self.value)
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Whether a typed value is something the slider could hold
    pub fn accepts(&self, value: &str) -> bool {
        value
            .trim()
            .parse::<f64>()
            .map(|v| v >= self.min && v <= self.max)
            .unwrap_or(false)
    }

    /// Value one step up (or down), snapped to the step grid and clamped
    pub fn stepped_value(&self, up: bool) -> String {
        let current = self.value.trim().parse::<f64>().unwrap_or(1.0);
        let delta = if up { self.step } else { -self.step };
        let steps = ((current + delta) / self.step).round();
        let next = (steps * self.step).clamp(self.min, self.max);
        format_speed(next)
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new("1", 0.5, 2.0, 0.1)
    }
}

/// Format a speed without float noise: 1.0 → "1", 1.1 → "1.1"
fn format_speed(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

/// Busy indicator shown while speech is pending or playing
#[derive(Debug, Default, Clone)]
pub struct LoadingIndicator {
    visible: bool,
}

impl LoadingIndicator {
    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Everything the user sees
#[derive(Debug, Default, Clone)]
pub struct Surface {
    pub text: TextInput,
    pub button: ButtonLabel,
    pub voice_select: VoiceSelect,
    pub speed: SpeedControl,
    pub loading: LoadingIndicator,
    /// One-line message, e.g. where the last recording was saved
    pub status: Option<String>,
}

impl Surface {
    pub fn new(speed: SpeedControl) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("a", "Alice", "en-US"),
            Voice::new("b", "Bruno", "fr-FR"),
            Voice::new("c", "Carol", "en-US"),
        ]
    }

    #[test]
    fn test_button_labels() {
        assert_eq!(ButtonLabel::Convert.to_string(), "Convert to Speech");
        assert_eq!(ButtonLabel::Pause.to_string(), "Pause");
        assert_eq!(ButtonLabel::Resume.to_string(), "Resume");
    }

    #[test]
    fn test_voice_select_options_match_voices() {
        let mut select = VoiceSelect::default();
        select.set_options(&voices());

        assert_eq!(select.options().len(), 3);
        assert_eq!(select.options()[1].value, "fr-FR");
        assert_eq!(select.options()[1].label, "Bruno");
        assert_eq!(select.value(), "en-US");

        select.set_options(&[]);
        assert!(select.options().is_empty());
        assert_eq!(select.value(), "");
    }

    #[test]
    fn test_voice_select_set_value() {
        let mut select = VoiceSelect::default();
        select.set_options(&voices());

        select.set_value("fr-FR");
        assert_eq!(select.selected().unwrap().label, "Bruno");

        select.set_value("de-DE");
        assert!(select.selected().is_none());
        assert_eq!(select.value(), "");
    }

    #[test]
    fn test_voice_select_adjacent_wraps() {
        let mut select = VoiceSelect::default();
        assert!(select.adjacent_index(true).is_none());

        select.set_options(&voices());
        assert_eq!(select.adjacent_index(true), Some(1));
        assert_eq!(select.adjacent_index(false), Some(2));

        select.select_index(2);
        assert_eq!(select.adjacent_index(true), Some(0));
    }

    #[test]
    fn test_speed_label_and_steps() {
        let mut speed = SpeedControl::default();
        assert_eq!(speed.label(), "1x");
        assert_eq!(speed.stepped_value(true), "1.1");
        assert_eq!(speed.stepped_value(false), "0.9");

        speed.set_value("2");
        assert_eq!(speed.stepped_value(true), "2");

        speed.set_value("0.5");
        assert_eq!(speed.stepped_value(false), "0.5");
        assert_eq!(speed.label(), "0.5x");
    }

    #[test]
    fn test_speed_accepts_within_bounds() {
        let speed = SpeedControl::default();
        assert!(speed.accepts("1.5"));
        assert!(!speed.accepts("3"));
        assert!(!speed.accepts("fast"));
    }

    #[test]
    fn test_text_input_editing() {
        let mut text = TextInput::default();
        text.insert_str("Helloo");
        text.backspace();
        assert_eq!(text.value(), "Hello");
        text.clear();
        assert_eq!(text.value(), "");
    }
}
