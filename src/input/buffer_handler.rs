//! Buffer handler for collecting text input
//!
//! Used when a value has to be typed in before it takes effect
//! (e.g., entering a speed for the speed control)

use super::{HandlerAction, KeyHandler};
use crate::controller::SpeechController;
use crate::Result;
use log::debug;

/// Callback function type for when input is complete
pub type OnAcceptFn = Box<dyn FnOnce(String, &mut SpeechController) -> Result<()> + Send>;

/// Handler that collects text input until Enter is pressed
///
/// The collected text is echoed on the status line behind `prompt`.
/// Escape abandons the input without calling back.
pub struct BufferHandler {
    /// Shown before the typed text
    prompt: String,

    /// Accumulated input buffer
    buffer: String,

    /// Callback to execute when Enter is pressed
    on_accept: Option<OnAcceptFn>,
}

impl BufferHandler {
    /// Create a new buffer handler
    ///
    /// The callback will be invoked with the collected text when user presses Enter
    pub fn new(prompt: impl Into<String>, on_accept: OnAcceptFn) -> Self {
        Self {
            prompt: prompt.into(),
            buffer: String::new(),
            on_accept: Some(on_accept),
        }
    }

    fn echo(&self, controller: &mut SpeechController) {
        controller.surface_mut().status = Some(format!("{}: {}", self.prompt, self.buffer));
    }

    /// Process input with controller access
    pub fn process_with_controller(
        &mut self,
        key: &[u8],
        controller: &mut SpeechController,
    ) -> Result<HandlerAction> {
        match key {
            // Enter - accept input and invoke callback
            b"\r" | b"\n" => {
                debug!("BufferHandler: accepting input '{}'", self.buffer);
                controller.surface_mut().status = None;

                if let Some(callback) = self.on_accept.take() {
                    callback(self.buffer.trim().to_string(), controller)?;
                }

                Ok(HandlerAction::Remove)
            }

            // Escape - abandon input
            b"\x1b" => {
                debug!("BufferHandler: cancelled");
                controller.surface_mut().status = None;
                Ok(HandlerAction::Remove)
            }

            // Backspace - remove last character
            b"\x08" | b"\x7f" => {
                if !self.buffer.is_empty() {
                    self.buffer.pop();
                    debug!("BufferHandler: backspace, buffer now '{}'", self.buffer);
                }
                self.echo(controller);
                Ok(HandlerAction::Handled)
            }

            // Regular character - add to buffer
            _ => {
                if let Ok(s) = std::str::from_utf8(key) {
                    if !s.chars().any(char::is_control) {
                        self.buffer.push_str(s);
                        debug!("BufferHandler: added '{}', buffer now '{}'", s, self.buffer);
                    }
                }
                self.echo(controller);
                Ok(HandlerAction::Handled)
            }
        }
    }
}

impl KeyHandler for BufferHandler {
    fn process(&mut self, key: &[u8]) -> Result<HandlerAction> {
        // Without a controller only the buffer itself can change
        match key {
            b"\r" | b"\n" | b"\x1b" => Ok(HandlerAction::Remove),
            b"\x08" | b"\x7f" => {
                self.buffer.pop();
                Ok(HandlerAction::Handled)
            }
            _ => {
                if let Ok(s) = std::str::from_utf8(key) {
                    if !s.chars().any(char::is_control) {
                        self.buffer.push_str(s);
                    }
                }
                Ok(HandlerAction::Handled)
            }
        }
    }

    fn process_with_context(
        &mut self,
        key: &[u8],
        controller: &mut SpeechController,
    ) -> Result<HandlerAction> {
        self.process_with_controller(key, controller)
    }
}
