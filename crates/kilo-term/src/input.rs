// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Turns raw stdin bytes into key events. The interesting case is the
// escape-introducer byte (0x1B): it is either a standalone Escape keypress
// or the start of a multi-byte sequence such as an arrow key (`ESC [ A`).
// The two are distinguished with the device's bounded read: if no follow-on
// byte arrives within the ~100ms window, the ESC was standalone.
//
// # Design
//
// Decoding is a small explicit state machine (`Start` → `SawEscape` →
// `SawBracket`/`DiscardFinal`) with a pure transition function over `Option<u8>`, where
// `None` means "the bounded wait elapsed with nothing available". The pure
// function is what the tests exercise; [`read_key`] just drives it against
// a [`ByteSource`].
//
// Unrecognized sequences degrade to [`Key::Escape`] — the extra bytes are
// discarded, not pushed back. Accepted information loss for sequences this
// editor does not handle.

use crate::error::Result;

/// The escape-introducer byte.
pub const ESC: u8 = 0x1B;

/// Map a letter to its control-key byte (`ctrl(b'q')` = 0x11).
///
/// Mirrors what the terminal sends when Ctrl is held: the character with
/// the upper three bits stripped.
#[inline]
#[must_use]
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1F
}

// ─── Key events ──────────────────────────────────────────────────────────────

/// A decoded key event.
///
/// Produced per input cycle and not persisted. Printable and control bytes
/// pass through as [`Byte`](Key::Byte); recognized escape sequences become
/// the named variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A literal input byte (printable character or control byte).
    Byte(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A standalone Escape keypress, or an unrecognized escape sequence.
    Escape,
}

// ─── Byte source ─────────────────────────────────────────────────────────────

/// A source of raw input bytes with bounded-wait reads.
///
/// `Ok(None)` means the device-level wait (~100ms with `VMIN=0, VTIME=1`)
/// elapsed with nothing available. That is a normal condition, not an error;
/// callers retry or use it to resolve the ESC ambiguity.
pub trait ByteSource {
    /// Read one byte, waiting at most the device-level bound.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Device`](crate::error::TermError::Device) on any
    /// I/O failure other than "timed out with nothing available".
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

// ─── Decoder state machine ───────────────────────────────────────────────────

/// Decoder position within a possible escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// No bytes consumed yet.
    Start,
    /// Consumed ESC; waiting to see if a sequence follows.
    SawEscape,
    /// Consumed `ESC [`; waiting for the final byte.
    SawBracket,
    /// Consumed ESC plus an unrecognized second byte; one more byte is
    /// consumed with the sequence before it degrades to Escape. Keeps the
    /// final byte of three-byte sequences (`ESC O A` and friends) from
    /// leaking out as a literal keypress.
    DiscardFinal,
}

/// Outcome of feeding one read result to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Need another read.
    Pending(DecodeState),
    /// A key event resolved.
    Done(Key),
}

/// Pure transition function: one read result in, next state or key out.
///
/// `None` is a timed-out read. In `Start` that just means "keep waiting";
/// past the ESC it means the user pressed Escape standalone.
const fn step(state: DecodeState, byte: Option<u8>) -> Step {
    match (state, byte) {
        (DecodeState::Start, None) => Step::Pending(DecodeState::Start),
        (DecodeState::Start, Some(ESC)) => Step::Pending(DecodeState::SawEscape),
        (DecodeState::Start, Some(b)) => Step::Done(Key::Byte(b)),

        (DecodeState::SawEscape, Some(b'[')) => Step::Pending(DecodeState::SawBracket),
        (DecodeState::SawEscape, None) => Step::Done(Key::Escape),
        (DecodeState::SawEscape, Some(_)) => Step::Pending(DecodeState::DiscardFinal),

        (DecodeState::DiscardFinal, _) => Step::Done(Key::Escape),

        (DecodeState::SawBracket, Some(b'A')) => Step::Done(Key::ArrowUp),
        (DecodeState::SawBracket, Some(b'B')) => Step::Done(Key::ArrowDown),
        (DecodeState::SawBracket, Some(b'C')) => Step::Done(Key::ArrowRight),
        (DecodeState::SawBracket, Some(b'D')) => Step::Done(Key::ArrowLeft),
        (DecodeState::SawBracket, _) => Step::Done(Key::Escape),
    }
}

/// Read one key event, blocking until something resolves.
///
/// Drives the decoder state machine against `src`. Timed-out reads before
/// the first byte are retried transparently; after an ESC they resolve the
/// standalone-Escape case.
///
/// # Errors
///
/// Propagates [`TermError::Device`](crate::error::TermError::Device) from
/// the byte source.
pub fn read_key(src: &mut impl ByteSource) -> Result<Key> {
    let mut state = DecodeState::Start;
    loop {
        match step(state, src.read_byte()?) {
            Step::Pending(next) => state = next,
            Step::Done(key) => return Ok(key),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
