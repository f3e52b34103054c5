//! Cursor — bounded position tracking with edge-wrap movement.
//!
//! The `Cursor` holds a row/column pair that always stays inside the probed
//! terminal geometry. Movement is a ±1 step with wrap semantics at the
//! edges:
//!
//! - **Left** at column 0 wraps to the last column of the row above; at the
//!   top row the column still wraps but the row stays 0.
//! - **Right** at the last column wraps to column 0 of the row below,
//!   clamped at the bottom row.
//! - **Up** at row 0 wraps to the last row; **Down** at the last row wraps
//!   to row 0.
//!
//! Geometry is fixed for the process lifetime, so these are the only bound
//! checks movement ever needs.

use kilo_term::input::Key;
use kilo_term::terminal::Size;

/// A cursor position within the terminal geometry.
///
/// Lightweight value type; invariant `row < rows && col < cols` for the
/// `Size` passed to the movement methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Current row (0-indexed).
    pub row: u16,
    /// Current column (0-indexed).
    pub col: u16,
}

impl Cursor {
    /// Create a cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { row: 0, col: 0 }
    }

    /// Create a cursor at a specific position.
    #[must_use]
    pub const fn at(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Apply a movement key. Non-movement keys are ignored.
    pub const fn apply(&mut self, key: Key, size: Size) {
        match key {
            Key::ArrowUp => self.move_up(size),
            Key::ArrowDown => self.move_down(size),
            Key::ArrowLeft => self.move_left(size),
            Key::ArrowRight => self.move_right(size),
            Key::Byte(_) | Key::Escape => {}
        }
    }

    /// Move one cell left, wrapping to the end of the row above.
    pub const fn move_left(&mut self, size: Size) {
        if self.col > 0 {
            self.col -= 1;
        } else {
            self.col = size.cols - 1;
            // No negative rows: at the top, only the column wraps.
            if self.row > 0 {
                self.row -= 1;
            }
        }
    }

    /// Move one cell right, wrapping to the start of the row below
    /// (clamped at the bottom row).
    pub const fn move_right(&mut self, size: Size) {
        if self.col + 1 < size.cols {
            self.col += 1;
        } else {
            self.col = 0;
            if self.row + 1 < size.rows {
                self.row += 1;
            }
        }
    }

    /// Move one row up, wrapping to the bottom at row 0.
    pub const fn move_up(&mut self, size: Size) {
        self.row = if self.row > 0 {
            self.row - 1
        } else {
            size.rows - 1
        };
    }

    /// Move one row down, wrapping to the top at the last row.
    pub const fn move_down(&mut self, size: Size) {
        self.row = if self.row + 1 < size.rows {
            self.row + 1
        } else {
            0
        };
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIZE: Size = Size { cols: 10, rows: 5 };

    fn moved(start: Cursor, key: Key) -> Cursor {
        let mut c = start;
        c.apply(key, SIZE);
        c
    }

    // ── Plain steps ─────────────────────────────────────────────────────

    #[test]
    fn interior_moves_are_single_steps() {
        assert_eq!(moved(Cursor::at(2, 4), Key::ArrowLeft), Cursor::at(2, 3));
        assert_eq!(moved(Cursor::at(2, 4), Key::ArrowRight), Cursor::at(2, 5));
        assert_eq!(moved(Cursor::at(2, 4), Key::ArrowUp), Cursor::at(1, 4));
        assert_eq!(moved(Cursor::at(2, 4), Key::ArrowDown), Cursor::at(3, 4));
    }

    // ── Wrap table ──────────────────────────────────────────────────────

    #[test]
    fn left_at_column_zero_wraps_to_row_above() {
        assert_eq!(moved(Cursor::at(3, 0), Key::ArrowLeft), Cursor::at(2, 9));
    }

    #[test]
    fn left_at_origin_keeps_row_zero() {
        assert_eq!(moved(Cursor::at(0, 0), Key::ArrowLeft), Cursor::at(0, 9));
    }

    #[test]
    fn right_at_last_column_wraps_to_row_below() {
        assert_eq!(moved(Cursor::at(2, 9), Key::ArrowRight), Cursor::at(3, 0));
    }

    #[test]
    fn right_at_bottom_right_stays_on_last_row() {
        assert_eq!(moved(Cursor::at(4, 9), Key::ArrowRight), Cursor::at(4, 0));
    }

    #[test]
    fn up_at_top_wraps_to_bottom() {
        assert_eq!(moved(Cursor::at(0, 3), Key::ArrowUp), Cursor::at(4, 3));
    }

    #[test]
    fn down_at_bottom_wraps_to_top() {
        assert_eq!(moved(Cursor::at(4, 3), Key::ArrowDown), Cursor::at(0, 3));
    }

    // ── Bounds hold everywhere ──────────────────────────────────────────

    #[test]
    fn movement_never_escapes_geometry() {
        let keys = [
            Key::ArrowUp,
            Key::ArrowDown,
            Key::ArrowLeft,
            Key::ArrowRight,
        ];
        for row in 0..SIZE.rows {
            for col in 0..SIZE.cols {
                for key in keys {
                    let c = moved(Cursor::at(row, col), key);
                    assert!(
                        c.row < SIZE.rows && c.col < SIZE.cols,
                        "{key:?} escaped from ({row},{col}) to {c:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn single_row_geometry() {
        let size = Size { cols: 4, rows: 1 };
        let mut c = Cursor::new();
        c.move_up(size);
        assert_eq!(c, Cursor::at(0, 0));
        c.move_left(size);
        assert_eq!(c, Cursor::at(0, 3));
        c.move_right(size);
        assert_eq!(c, Cursor::at(0, 0));
    }

    // ── Non-movement keys ───────────────────────────────────────────────

    #[test]
    fn other_keys_are_inert() {
        assert_eq!(moved(Cursor::at(2, 4), Key::Byte(b'x')), Cursor::at(2, 4));
        assert_eq!(moved(Cursor::at(2, 4), Key::Escape), Cursor::at(2, 4));
    }

    // ── End-to-end movement scenario ────────────────────────────────────

    #[test]
    fn up_then_left_from_origin() {
        let mut c = Cursor::new();
        c.apply(Key::ArrowUp, SIZE);
        assert_eq!(c, Cursor::at(4, 0));
        c.apply(Key::ArrowLeft, SIZE);
        assert_eq!(c, Cursor::at(3, 9));
    }
}
