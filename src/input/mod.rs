//! Input handling and key bindings
//!
//! The input system uses a stack-based handler architecture where handlers
//! can be pushed/popped to create modal interfaces (typed speed entry, etc.)

pub mod buffer_handler;
pub mod default_handler;
pub mod handler;
pub mod keymap;

pub use buffer_handler::BufferHandler;
pub use default_handler::DefaultKeyHandler;
pub use handler::{HandlerAction, HandlerStack, KeyHandler};
pub use keymap::{create_default_keymap, split_keys, KeyAction};
