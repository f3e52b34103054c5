// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, geometry, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control — there is no
// safe alternative. Each unsafe block is minimal and documented.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. Entering raw mode snapshots
// the original termios exactly once, applies the raw configuration, and
// guarantees the snapshot is reapplied on every exit path: normal return
// (guard drop), propagated fatal errors (guard drop during unwinding of
// the call stack), and panics (panic hook).
//
// The panic hook deserves special mention: it bypasses Rust's stdout lock
// entirely, writing a pre-built restore sequence directly to fd 1. This
// prevents deadlock if the panic happened while holding the stdout lock
// (common during frame rendering). One raw write, termios restored, then
// the original panic handler prints its message to a working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::input::{ByteSource, ESC};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
///
/// Probed once at startup and treated as read-only afterwards — this core
/// does not track live resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells). Always > 0.
    pub cols: u16,
    /// Number of rows (height in character cells). Always > 0.
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// reported column count is zero (some terminals answer the ioctl with
/// an empty winsize — callers must fall back to the cursor-report probe).
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore cooked mode without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Visual restore sequence for emergency use: show cursor, clear screen,
/// home. Leaves the terminal visually clean so the panic message is
/// readable; termios restore happens separately.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. Our hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the visual restore sequence directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII cleanup.
///
/// [`enter`](Self::enter) snapshots the current termios, applies the raw
/// configuration, and returns the guard. The original configuration is
/// reapplied when the guard is dropped — on normal return, on a propagated
/// error, or (via the panic hook) on panic.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let raw = RawMode::enter()?;
/// // ... render frames, decode keys ...
/// drop(raw); // original termios reapplied here
/// # Ok::<(), kilo_term::error::TermError>(())
/// ```
pub struct RawMode {
    /// Original termios saved before entering raw mode. `None` once
    /// restored (or when stdin was never a TTY).
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Snapshot the terminal configuration and apply raw mode.
    ///
    /// The raw configuration disables input echo, canonical (line-buffered)
    /// input, signal-generating keys, extended input processing, input flow
    /// control and CR/NL translation, and output post-processing; it forces
    /// 8-bit character cells and sets `VMIN = 0, VTIME = 1` so every read
    /// returns within ~100ms even with no bytes available.
    ///
    /// Applied with `TCSAFLUSH`, discarding unread input. No-op (but still
    /// installs the panic hook) when stdin is not a TTY, which is what lets
    /// the test suite run under pipes.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Device`] if the termios snapshot or the raw
    /// configuration cannot be applied.
    #[cfg(unix)]
    pub fn enter() -> Result<Self> {
        use std::os::unix::io::AsRawFd;

        install_panic_hook();

        if !is_tty() {
            return Ok(Self { original: None });
        }

        let fd = io::stdin().as_raw_fd();

        let original = unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(TermError::Device(io::Error::last_os_error()));
            }
            termios
        };

        // Save to the global backup for the panic hook before mutating
        // anything — the snapshot must exist on every path past this point.
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }

        unsafe {
            let mut termios = original;

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most one tenth of a
            // second, with zero bytes if nothing arrived. This bounded wait
            // is what distinguishes a lone ESC from an escape sequence.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                    *guard = None;
                }
                return Err(TermError::Device(io::Error::last_os_error()));
            }
        }

        Ok(Self {
            original: Some(original),
        })
    }

    #[cfg(not(unix))]
    pub fn enter() -> Result<Self> {
        install_panic_hook();
        Ok(Self {})
    }

    /// Reapply the saved configuration.
    ///
    /// Idempotent: the snapshot is taken out on the first call, so calling
    /// `restore` again (or dropping the guard afterwards) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Device`] if reapplying the snapshot fails.
    #[cfg(unix)]
    pub fn restore(&mut self) -> Result<()> {
        if let Some(original) = self.original.take() {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original) != 0 {
                    return Err(TermError::Device(io::Error::last_os_error()));
                }
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn restore(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// Raw byte I/O on the controlling terminal's standard descriptors.
///
/// Reads honor the `VMIN=0, VTIME=1` policy installed by [`RawMode`]: a
/// read that returns no byte within ~100ms yields `Ok(None)`, which callers
/// treat as a normal retry condition. Writes go straight to fd 1.
#[derive(Debug, Default)]
pub struct Tty(());

impl Tty {
    /// Handle on the process's controlling terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self(())
    }
}

impl ByteSource for Tty {
    #[cfg(unix)]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            // VTIME elapsed with nothing available.
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // Would-block and interrupted reads are retry conditions,
                    // same as the VTIME timeout.
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(TermError::Device(err)),
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(err) => Err(TermError::Device(err)),
        }
    }
}

impl Write for Tty {
    #[cfg(unix)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            #[allow(clippy::cast_sign_loss)] // n >= 0 guaranteed above.
            let written = n as usize;
            Ok(written)
        }
    }

    #[cfg(not(unix))]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Raw fd writes are unbuffered.
        Ok(())
    }
}

// ─── Geometry Probing ───────────────────────────────────────────────────────

/// Longest cursor position report we accept: `ESC [ 65535 ; 65535 R` fits
/// with room to spare.
const REPORT_BUF_LEN: usize = 32;

/// Determine the terminal's visible geometry.
///
/// Primary path is `ioctl(TIOCGWINSZ)`; when that is unavailable or reports
/// zero columns, falls back to the cursor-report round trip over `tty`.
///
/// # Errors
///
/// Returns [`TermError::Geometry`] when both paths fail — the caller cannot
/// render without a geometry and treats this as fatal.
pub fn probe_size(tty: &mut Tty) -> Result<Size> {
    match get_size() {
        Some(size) => Ok(size),
        None => probe_size_via_cursor(tty),
    }
}

/// Fallback geometry probe: park the cursor at the bottom-right cell, then
/// ask the terminal where the cursor is.
///
/// `ESC[999C ESC[999B` saturates at the true boundary, so the subsequent
/// `ESC[6n` report (`ESC [ <row> ; <col> R`) names the bottom-right cell —
/// which is the geometry. The report is read byte-by-byte into a bounded
/// buffer until the `R` terminator, the buffer fills, or a read times out.
///
/// # Errors
///
/// [`TermError::Device`] on write/read failure, [`TermError::Geometry`]
/// when the response cannot be parsed.
pub fn probe_size_via_cursor<T: ByteSource + Write>(tty: &mut T) -> Result<Size> {
    tty.write_all(ansi::CURSOR_FAR_BOTTOM_RIGHT)
        .map_err(TermError::Device)?;
    tty.write_all(ansi::CURSOR_POSITION_QUERY)
        .map_err(TermError::Device)?;
    tty.flush().map_err(TermError::Device)?;

    let mut report = [0u8; REPORT_BUF_LEN];
    let mut len = 0;
    while len < REPORT_BUF_LEN - 1 {
        match tty.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => {
                report[len] = b;
                len += 1;
            }
        }
    }

    parse_cursor_report(&report[..len])
}

/// Parse a cursor position report (`ESC [ <row> ; <col>`, terminator already
/// stripped) into a [`Size`].
///
/// # Errors
///
/// Returns [`TermError::Geometry`] when the leading two bytes are not the
/// escape introducer, the numeric fields don't parse, or either is zero.
pub fn parse_cursor_report(report: &[u8]) -> Result<Size> {
    let body = report
        .strip_prefix(&[ESC, b'['])
        .ok_or_else(|| TermError::Geometry("cursor report missing ESC[ introducer".into()))?;

    let text = std::str::from_utf8(body)
        .map_err(|_| TermError::Geometry("cursor report is not ASCII".into()))?;

    let (rows, cols) = text
        .split_once(';')
        .ok_or_else(|| TermError::Geometry(format!("cursor report missing ';': {text:?}")))?;

    let rows: u16 = rows
        .parse()
        .map_err(|_| TermError::Geometry(format!("bad row count in cursor report: {rows:?}")))?;
    let cols: u16 = cols
        .parse()
        .map_err(|_| TermError::Geometry(format!("bad column count in cursor report: {cols:?}")))?;

    if rows == 0 || cols == 0 {
        return Err(TermError::Geometry(format!(
            "degenerate geometry {rows}x{cols} in cursor report"
        )));
    }

    Ok(Size { cols, rows })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
