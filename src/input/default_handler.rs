//! Default key handler
//!
//! Maps bound keys to surface events (convert, save, voice and speed
//! changes) and hands everything else back to be typed into the text field.

use super::buffer_handler::BufferHandler;
use super::keymap::split_keys;
use super::{HandlerAction, HandlerStack, KeyAction};
use crate::controller::SpeechController;
use crate::{Result, SpeechpadError};
use log::{debug, trace, warn};
use std::collections::HashMap;

/// Default key handler for speechpad commands
pub struct DefaultKeyHandler {
    /// Key bindings map
    keymap: HashMap<Vec<u8>, KeyAction>,
}

impl DefaultKeyHandler {
    /// Create a new default key handler
    pub fn new(keymap: HashMap<Vec<u8>, KeyAction>) -> Self {
        debug!(
            "Creating default key handler with {} bindings",
            keymap.len()
        );
        Self { keymap }
    }

    /// Process everything one read returned, key by key
    ///
    /// Modal handlers on the stack see each key first. Passthrough keys
    /// are typed into the text field. A failing command is reported on the
    /// status line and the remaining keys still run. Returns `Quit` as soon
    /// as a key quits, `Handled` otherwise.
    pub fn process_input(
        &mut self,
        input: &[u8],
        controller: &mut SpeechController,
        handlers: &mut HandlerStack,
    ) -> Result<HandlerAction> {
        for key in split_keys(input, &self.keymap) {
            let action = if handlers.is_empty() {
                self.process_key(key, controller, handlers)
            } else {
                handlers.process_with_context(key, controller)
            };

            match action {
                Ok(HandlerAction::Passthrough) => {
                    let text = String::from_utf8_lossy(key);
                    controller.surface_mut().text.insert_str(&text);
                }
                Ok(HandlerAction::Quit) => return Ok(HandlerAction::Quit),
                Ok(HandlerAction::Handled | HandlerAction::Remove) => {}
                Err(e) => {
                    warn!("Command failed: {}", e);
                    controller.surface_mut().status = Some(e.to_string());
                }
            }
        }

        Ok(HandlerAction::Handled)
    }

    /// Process a key with the default bindings
    ///
    /// Unbound printable input is passed through for the text field;
    /// unbound control and escape sequences are swallowed.
    pub fn process_key(
        &mut self,
        key: &[u8],
        controller: &mut SpeechController,
        handlers: &mut HandlerStack,
    ) -> Result<HandlerAction> {
        if let Some(action) = self.keymap.get(key).cloned() {
            trace!("Key action: {:?}", action);
            return self.execute_action(&action, controller, handlers);
        }

        match std::str::from_utf8(key) {
            Ok(s) if !s.is_empty() && !s.chars().any(char::is_control) => {
                Ok(HandlerAction::Passthrough)
            }
            _ => {
                trace!("Ignoring unbound key {:?}", key);
                Ok(HandlerAction::Handled)
            }
        }
    }

    /// Execute a bound action
    fn execute_action(
        &mut self,
        action: &KeyAction,
        controller: &mut SpeechController,
        handlers: &mut HandlerStack,
    ) -> Result<HandlerAction> {
        use KeyAction::*;

        match action {
            Convert => match controller.text_to_speech() {
                Ok(()) => {}
                Err(SpeechpadError::EmptyInputIgnored) => debug!("Convert with empty text ignored"),
                Err(e) => return Err(e),
            },

            Save => {
                if let Some(path) = controller.save()? {
                    debug!("Saved recording to {}", path.display());
                }
            }

            NextVoice => controller.cycle_voice(true),
            PrevVoice => controller.cycle_voice(false),
            DefaultVoice => controller.set_default_voice(),
            ReloadVoices => controller.load_voices(),

            SpeedUp => controller.step_speed(true),
            SpeedDown => controller.step_speed(false),

            // Collect a typed speed in a modal buffer
            EnterSpeed => {
                debug!("Entering speed input");
                controller.surface_mut().status = Some("Speed: ".to_string());
                handlers.push(Box::new(BufferHandler::new(
                    "Speed",
                    Box::new(|input: String, controller: &mut SpeechController| {
                        Self::set_speed(input, controller);
                        Ok(())
                    }),
                )));
            }

            Paste => match crate::clipboard::get_from_clipboard() {
                Ok(text) => {
                    let text = text.replace(['\r', '\n'], " ");
                    controller.surface_mut().text.insert_str(&text);
                }
                Err(e) => {
                    warn!("Paste failed: {}", e);
                    controller.surface_mut().status = Some("Clipboard unavailable".to_string());
                }
            },

            ClearText => controller.surface_mut().text.clear(),
            Backspace => controller.surface_mut().text.backspace(),

            Quit => return Ok(HandlerAction::Quit),
        }

        Ok(HandlerAction::Handled)
    }

    /// Apply a typed speed if the speed control could hold it
    fn set_speed(input: String, controller: &mut SpeechController) {
        if controller.surface().speed.accepts(&input) {
            debug!("Setting speed to {}", input);
            controller.on_speed_input(&input);
        } else {
            let (min, max) = controller.surface().speed.bounds();
            debug!("Invalid speed value: {}", input);
            controller.surface_mut().status =
                Some(format!("Invalid speed {:?} (allowed {}-{})", input, min, max));
        }
    }
}
