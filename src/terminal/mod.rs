//! Terminal setup: raw mode, window size and screen restore

pub mod util;

pub use util::{get_terminal_size, is_tty, restore_termios, set_raw_mode, TermiosGuard};
