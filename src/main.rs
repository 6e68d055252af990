//! speechpad main entry point
//!
//! The main loop monitors two sources:
//! 1. stdin (user keyboard input) - edits the text field or runs a command
//! 2. Signals (SIGWINCH for resize) - redraws at the new width
//!
//! Between reads it pumps synthesizer events so the button label, the
//! loading indicator and recordings follow the utterance lifecycle.

use log::{debug, error, info, warn};
use mio::{Events, Interest, Poll, Token};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use speechpad::config::Config;
use speechpad::controller::{ControllerOptions, SpeechController};
use speechpad::input::{create_default_keymap, DefaultKeyHandler, HandlerAction, HandlerStack};
use speechpad::platform::is_wsl;
use speechpad::speech::{create_synth, VoiceCatalog};
use speechpad::terminal::{get_terminal_size, is_tty, TermiosGuard};
use speechpad::ui::{render, Surface};
use speechpad::{Result, SpeechpadError};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

/// How long to wait for input before pumping speech events again
const TICK: Duration = Duration::from_millis(100);

/// Global flag set by SIGWINCH handler
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// SIGWINCH handler - sets flag when terminal is resized
extern "C" fn handle_sigwinch(_: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Parsed command line
struct Args {
    debug: bool,
    list_voices: bool,
    json: bool,
    text: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = Args {
            debug: false,
            list_voices: false,
            json: false,
            text: None,
        };
        let mut words = Vec::new();

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--debug" | "-d" => args.debug = true,
                "--list-voices" => args.list_voices = true,
                "--json" => args.json = true,
                "--help" | "-h" => {
                    println!(
                        "Usage: {} [--debug|-d] [--list-voices [--json]] [TEXT...]",
                        speechpad::APP_NAME
                    );
                    process::exit(0);
                }
                _ => words.push(arg),
            }
        }

        if !words.is_empty() {
            args.text = Some(words.join(" "));
        }
        args
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        // Debug mode: write to speechpad.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("speechpad.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open speechpad.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "speechpad version {} starting (debug mode, logging to speechpad.log)",
            speechpad::VERSION
        );
    } else {
        // Normal mode: minimal logging to stderr, only errors
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    let result = if args.list_voices {
        list_voices(args.json)
    } else {
        run(args.text)
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("{}: {}", speechpad::APP_NAME, e);
        process::exit(1);
    }
}

/// Print the voice catalog and exit
fn list_voices(json: bool) -> Result<()> {
    let config = Config::load()?;
    let mut synth = create_synth(config.backend()?)?;

    let mut catalog = VoiceCatalog::new();
    catalog.replace(synth.voices()?);

    let mut stdout = io::stdout();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(catalog.voices())?)?;
    } else {
        for voice in catalog.voices() {
            writeln!(stdout, "{} ({})", voice.name, voice.lang)?;
        }
    }
    Ok(())
}

fn run(initial_text: Option<String>) -> Result<()> {
    debug!("Initializing speechpad");

    // Verify stdin is a TTY
    let stdin_fd = io::stdin().as_raw_fd();
    if !is_tty(stdin_fd) {
        eprintln!("Error: speechpad requires an interactive terminal (stdin is not a TTY)");
        eprintln!("Usage: Run speechpad directly in a terminal, not through pipes or redirects");
        eprintln!("Voices can be listed without a terminal: speechpad --list-voices");
        process::exit(1);
    }

    let config = Config::load()?;
    info!("Configuration loaded from {:?}", config.path());

    let synth = create_synth(config.backend()?)?;

    let mut surface = Surface::new(config.speed_control());
    if let Some(text) = initial_text {
        surface.text.set(text);
    }

    let options = ControllerOptions {
        default_lang: config.default_lang(),
        select_default_voice: config.select_default_voice(),
        recording: config.recording(),
    };
    let mut controller = SpeechController::new(synth, surface, options);
    controller.init_voices();

    let keymap = create_default_keymap();
    info!("Key handler initialized with {} bindings", keymap.len());
    let mut default_handler = DefaultKeyHandler::new(keymap);
    let mut handlers = HandlerStack::new();

    // Raw mode and the alternate screen, restored when the guard drops
    let _guard = TermiosGuard::enter(stdin_fd)?;

    let (mut cols, rows) = get_terminal_size(stdin_fd)?;
    info!("Terminal size: {}x{}", cols, rows);

    // Set up signal handler for window resize
    unsafe {
        signal::signal(Signal::SIGWINCH, SigHandler::Handler(handle_sigwinch)).map_err(|e| {
            SpeechpadError::Terminal(format!("Failed to set SIGWINCH handler: {}", e))
        })?;
    }

    // WSL doesn't support epoll on TTY file descriptors, so use select() instead
    let use_select = is_wsl();

    let mut mio_poll = if !use_select {
        debug!("Using mio::Poll for event loop");
        let poll = Poll::new()?;

        let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN, Interest::READABLE)?;

        Some((poll, Events::with_capacity(16)))
    } else {
        debug!("Using select() for event loop (WSL mode)");
        None
    };

    info!("speechpad ready - entering event loop");
    let mut stdout = io::stdout();

    loop {
        controller.pump_events();

        let resized = RESIZE_PENDING.swap(false, Ordering::Relaxed);
        if resized {
            let (new_cols, new_rows) = get_terminal_size(stdin_fd)?;
            info!("Terminal resized to {}x{}", new_cols, new_rows);
            cols = new_cols;
        }

        if controller.take_dirty() || resized {
            render::draw(
                &mut stdout,
                controller.surface(),
                controller.backend_name(),
                cols as usize,
            )?;
        }

        let stdin_ready = if use_select {
            use nix::sys::select::{select, FdSet};
            use nix::sys::time::{TimeVal, TimeValLike};
            use std::os::unix::io::BorrowedFd;

            let stdin_borrowed = unsafe { BorrowedFd::borrow_raw(stdin_fd) };

            // Rebuild FdSet each iteration (select() modifies it)
            let mut read_fds = FdSet::new();
            read_fds.insert(stdin_borrowed);
            let mut timeout = TimeVal::milliseconds(TICK.as_millis() as i64);

            match select(None, Some(&mut read_fds), None, None, Some(&mut timeout)) {
                Ok(_) => read_fds.contains(stdin_borrowed),
                Err(nix::errno::Errno::EINTR) => {
                    debug!("select() interrupted by signal");
                    false
                }
                Err(e) => {
                    error!("select() error: {:?}", e);
                    return Err(SpeechpadError::Io(io::Error::from_raw_os_error(e as i32)));
                }
            }
        } else if let Some((ref mut poll, ref mut events)) = mio_poll {
            match poll.poll(events, Some(TICK)) {
                Ok(()) => events.iter().any(|event| event.token() == STDIN),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
                Err(e) => return Err(e.into()),
            }
        } else {
            false
        };

        if stdin_ready {
            match handle_stdin(&mut controller, &mut default_handler, &mut handlers) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("stdin error: {}", e);
                    break;
                }
            }
        }
    }

    info!("speechpad exiting");
    if let Err(e) = controller.shutdown() {
        warn!("Failed to silence synthesizer: {}", e);
    }
    Ok(())
}

/// Handle user input from stdin
///
/// Returns `false` when the program should exit.
fn handle_stdin(
    controller: &mut SpeechController,
    default_handler: &mut DefaultKeyHandler,
    handlers: &mut HandlerStack,
) -> Result<bool> {
    let mut buf = [0u8; 4096];

    let n = io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(false);
    }

    let action = default_handler.process_input(&buf[..n], controller, handlers)?;
    Ok(action != HandlerAction::Quit)
}
