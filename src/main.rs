// SPDX-License-Identifier: MIT
//
// kilo — a small terminal text editor.
//
// This is the main binary that wires together the crates:
//
//   kilo-term   → raw mode, geometry probing, key decoding, render buffer
//   kilo-editor → cursor model, frame composition
//
// Each cycle of the editor loop flows:
//
//   draw_frame → RenderBuffer → one write to the tty
//   read_key   → dispatch (arrows move the cursor, Ctrl-Q quits)
//
// The raw-mode guard is scoped to run(): every exit path — normal quit,
// fatal device error, fatal geometry error — drops it on the way out, so
// the original termios is restored before main() reports anything. The
// screen itself is cleared separately: on quit by the dispatcher, on a
// fatal error by main() just before the diagnostic.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use kilo_editor::cursor::Cursor;
use kilo_editor::screen;
use kilo_term::ansi;
use kilo_term::input::{self, Key, ctrl};
use kilo_term::output::RenderBuffer;
use kilo_term::terminal::{RawMode, Size, Tty, probe_size};

/// The quit key: Ctrl-Q.
const QUIT: u8 = ctrl(b'q');

// ─── Editor ──────────────────────────────────────────────────────────────────

/// What the dispatcher tells the loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep running.
    Continue,
    /// Exit the editor loop cleanly.
    Quit,
}

/// The editor's entire mutable state: fixed geometry, a cursor inside it,
/// and the reusable frame buffer. Owned exclusively by the one thread of
/// control — no locking, no globals.
struct Editor {
    size: Size,
    cursor: Cursor,
    frame: RenderBuffer,
}

impl Editor {
    fn new(size: Size) -> Self {
        Self {
            size,
            cursor: Cursor::new(),
            frame: RenderBuffer::new(),
        }
    }

    /// Render → read one key → dispatch, until the quit key is seen.
    fn run(&mut self, tty: &mut Tty) -> Result<()> {
        loop {
            screen::draw_frame(&mut self.frame, self.size, self.cursor);
            self.frame.flush_to(tty)?;

            let key = input::read_key(tty)?;
            match self.dispatch(key, tty)? {
                Action::Continue => {}
                Action::Quit => return Ok(()),
            }
        }
    }

    /// Handle one decoded key. Movement keys mutate the cursor; the quit
    /// key leaves a cleared screen behind and ends the loop; everything
    /// else is inert for now.
    fn dispatch(&mut self, key: Key, out: &mut impl Write) -> Result<Action> {
        match key {
            Key::Byte(QUIT) => {
                ansi::clear_screen(out)?;
                ansi::cursor_home(out)?;
                out.flush()?;
                info!("quit requested");
                Ok(Action::Quit)
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.cursor.apply(key, self.size);
                debug!(?key, row = self.cursor.row, col = self.cursor.col, "cursor moved");
                Ok(Action::Continue)
            }
            Key::Byte(_) | Key::Escape => Ok(Action::Continue),
        }
    }
}

// ─── Process wiring ──────────────────────────────────────────────────────────

/// Initialize logging to a file.
///
/// Stdout belongs to the raw-mode screen, so diagnostics go to
/// `$HOME/.kilo/kilo.log` (append mode, no ANSI). Level defaults to `info`,
/// overridable through `KILO_LOG`. Logging is best-effort: if the file
/// cannot be opened the editor simply runs unlogged.
fn init_logging() {
    let log_path = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map_or_else(|| PathBuf::from("kilo.log"), |h| h.join(".kilo").join("kilo.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("KILO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run() -> Result<()> {
    let _raw = RawMode::enter().context("entering raw mode")?;

    let mut tty = Tty::new();
    let size = probe_size(&mut tty).context("determining terminal geometry")?;
    info!(cols = size.cols, rows = size.rows, "terminal geometry probed");

    Editor::new(size).run(&mut tty)
}

fn main() {
    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "kilo starting");

    if let Err(err) = run() {
        // Raw mode was already restored when run()'s guard dropped. Leave
        // a clean screen so the diagnostic is readable.
        let mut tty = Tty::new();
        let _ = ansi::clear_screen(&mut tty);
        let _ = ansi::cursor_home(&mut tty);

        error!("fatal: {err:#}");
        eprintln!("kilo: {err:#}");
        process::exit(1);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Size = Size { cols: 10, rows: 5 };

    fn editor() -> Editor {
        Editor::new(SIZE)
    }

    #[test]
    fn quit_key_clears_screen_and_quits() {
        let mut ed = editor();
        let mut out = Vec::new();
        let action = ed.dispatch(Key::Byte(QUIT), &mut out).unwrap();
        assert_eq!(action, Action::Quit);
        assert_eq!(out, b"\x1b[2J\x1b[H");
    }

    #[test]
    fn arrows_move_the_cursor() {
        let mut ed = editor();
        let mut out = Vec::new();
        let action = ed.dispatch(Key::ArrowDown, &mut out).unwrap();
        assert_eq!(action, Action::Continue);
        assert_eq!(ed.cursor, Cursor::at(1, 0));
        assert!(out.is_empty());
    }

    #[test]
    fn other_keys_are_inert() {
        let mut ed = editor();
        let mut out = Vec::new();
        for key in [Key::Byte(b'x'), Key::Escape, Key::Byte(ctrl(b'a'))] {
            let action = ed.dispatch(key, &mut out).unwrap();
            assert_eq!(action, Action::Continue);
        }
        assert_eq!(ed.cursor, Cursor::new());
        assert!(out.is_empty());
    }

    #[test]
    fn quit_key_is_ctrl_q() {
        assert_eq!(QUIT, 0x11);
    }
}
