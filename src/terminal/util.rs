//! Terminal utilities

use crate::{Result, SpeechpadError};
use log::debug;
use nix::libc;
use std::io::{self, Write};
use std::os::unix::io::RawFd;

/// Leave the alternate screen and show the cursor
const LEAVE_SCREEN: &str = "\x1b[?1049l\x1b[?25h";

/// Enter the alternate screen and hide the cursor
const ENTER_SCREEN: &str = "\x1b[?1049h\x1b[?25l";

/// Whether `fd` refers to a terminal
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

/// Get the terminal size for the given file descriptor
///
/// Rendering truncates lines to the column count.
pub fn get_terminal_size(fd: RawFd) -> Result<(u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Ok((ws.ws_col, ws.ws_row))
    } else {
        // Default size if ioctl fails
        Ok((80, 24))
    }
}

/// Set raw mode on a terminal file descriptor
///
/// Raw mode delivers every keypress immediately, including Enter,
/// Ctrl+S and Alt+key escape sequences.
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let mut original_termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut original_termios) } != 0 {
        return Err(SpeechpadError::Terminal(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    let mut raw_termios = original_termios;

    unsafe {
        libc::cfmakeraw(&mut raw_termios);
        if libc::tcsetattr(fd, libc::TCSANOW, &raw_termios) != 0 {
            return Err(SpeechpadError::Terminal(format!(
                "tcsetattr failed: {}",
                io::Error::last_os_error()
            )));
        }
    }

    Ok(original_termios)
}

/// Restore terminal attributes
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}

/// RAII guard for the interactive screen
///
/// Switches to raw mode on the alternate screen, and puts the terminal
/// back the way it was on drop, even on an error path.
pub struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl TermiosGuard {
    pub fn enter(fd: RawFd) -> Result<Self> {
        let termios = set_raw_mode(fd)?;
        let mut stdout = io::stdout();
        stdout.write_all(ENTER_SCREEN.as_bytes())?;
        stdout.flush()?;
        Ok(Self { fd, termios })
    }
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(LEAVE_SCREEN.as_bytes());
        let _ = stdout.flush();
        restore_termios(self.fd, &self.termios);
        debug!("Terminal attributes restored");
    }
}
