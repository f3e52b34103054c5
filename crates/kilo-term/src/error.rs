// SPDX-License-Identifier: MIT
//
// Error types for the terminal device layer.
//
// Two things can go irrecoverably wrong at this level: the device itself
// (termios get/set, raw byte I/O) and geometry determination (both the
// ioctl and the cursor-report fallback failed, or the report was garbage).
// Everything else — a read timing out with no byte, an escape sequence we
// don't recognize — is a normal condition handled in place, never an error.

use std::io;

use thiserror::Error;

/// Fatal terminal-layer error.
#[derive(Debug, Error)]
pub enum TermError {
    /// Configuration get/set or raw byte I/O failed (not a timeout).
    #[error("terminal device error: {0}")]
    Device(#[from] io::Error),

    /// Neither geometry path produced a usable size.
    #[error("cannot determine terminal geometry: {0}")]
    Geometry(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TermError>;
