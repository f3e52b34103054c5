// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal device layer for kilo.
//
// Everything that touches the external, stateful terminal device lives
// here: raw-mode entry with guaranteed restore, geometry probing with a
// cursor-report fallback, byte-level key decoding with escape-sequence
// timeout handling, and the single-flush render buffer.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte sent to the terminal is
// accounted for.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;
