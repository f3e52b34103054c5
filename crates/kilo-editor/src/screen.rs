//! Frame composition — full-screen redraw into a render buffer.
//!
//! Rendering is stateless across frames: every cycle recomputes the whole
//! screen from the geometry and cursor, composes it into a [`RenderBuffer`],
//! and the caller flushes that buffer to the terminal in a single write.
//! No damage tracking, no diffing — at one screenful per keypress the
//! simple approach is plenty, and the single flush is what prevents
//! visible tearing.
//!
//! Frame layout: every row carries a zero-padded row label after the
//! clear-to-end-of-line; row 0 additionally shows the centered version
//! banner and the last row a debug status with geometry and cursor
//! coordinates. The hardware cursor is hidden during composition and
//! repositioned (1-indexed) before being shown again.

use std::io::Write;

use kilo_term::ansi;
use kilo_term::output::RenderBuffer;
use kilo_term::terminal::Size;

use crate::cursor::Cursor;

/// The welcome banner shown on the first row.
pub const BANNER: &str = concat!("Kilo editor -- version ", env!("CARGO_PKG_VERSION"));

/// Width of the zero-padded row index label.
const ROW_LABEL_WIDTH: usize = 3;

/// Compose one full frame into `out`.
///
/// The buffer's writes are infallible by policy (allocation failure drops
/// bytes silently), so composition itself cannot fail; I/O errors surface
/// when the caller flushes.
pub fn draw_frame(out: &mut RenderBuffer, size: Size, cursor: Cursor) {
    ansi::cursor_hide(out).ok();
    ansi::cursor_home(out).ok();

    for y in 0..size.rows {
        ansi::clear_line_right(out).ok();
        draw_row(out, size, cursor, y);
        if y + 1 < size.rows {
            out.append(b"\r\n");
        }
    }

    ansi::cursor_to(out, cursor.col, cursor.row).ok();
    ansi::cursor_show(out).ok();
}

/// Compose the content of row `y`: label, plus banner or status line.
fn draw_row(out: &mut RenderBuffer, size: Size, cursor: Cursor, y: u16) {
    write!(out, "{y:0width$}", width = ROW_LABEL_WIDTH).ok();

    if y == 0 {
        draw_banner(out, size.cols);
    } else if y + 1 == size.rows {
        draw_status(out, size, cursor);
    }
}

/// Center the version banner on the row, truncating if the terminal is
/// narrower than the banner.
fn draw_banner(out: &mut RenderBuffer, cols: u16) {
    let cols = usize::from(cols);
    // The row label already occupies the first cells of the row, so the
    // banner may only use what remains; overrunning `cols` would autowrap
    // and shift every following row.
    let avail = cols.saturating_sub(ROW_LABEL_WIDTH);
    let shown = &BANNER[..BANNER.len().min(avail)];
    let padding = (cols - shown.len()) / 2;
    out.append(" ".repeat(padding.saturating_sub(ROW_LABEL_WIDTH)).as_bytes());
    out.append(shown.as_bytes());
}

/// Debug status line: geometry and cursor coordinates.
fn draw_status(out: &mut RenderBuffer, size: Size, cursor: Cursor) {
    let mut status = format!(
        " {}x{} ({},{})",
        size.cols, size.rows, cursor.row, cursor.col
    );
    status.truncate(usize::from(size.cols).saturating_sub(ROW_LABEL_WIDTH));
    out.append(status.as_bytes());
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(size: Size, cursor: Cursor) -> String {
        let mut out = RenderBuffer::new();
        draw_frame(&mut out, size, cursor);
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    /// Strip escape sequences from one row, leaving its printable cells.
    fn printable(row: &str) -> String {
        let mut cells = String::new();
        let mut chars = row.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip through the sequence's final (alphabetic) byte.
                for f in chars.by_ref() {
                    if f.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                cells.push(c);
            }
        }
        cells
    }

    const SIZE_3X20: Size = Size { cols: 20, rows: 3 };

    #[test]
    fn frame_hides_cursor_and_homes_first() {
        let f = frame(SIZE_3X20, Cursor::new());
        assert!(f.starts_with("\x1b[?25l\x1b[H"));
    }

    #[test]
    fn frame_shows_cursor_last() {
        let f = frame(SIZE_3X20, Cursor::new());
        assert!(f.ends_with("\x1b[?25h"));
    }

    #[test]
    fn frame_has_one_segment_per_row() {
        let f = frame(SIZE_3X20, Cursor::at(1, 5));
        // Separator after every row except the last: rows - 1 occurrences.
        assert_eq!(f.matches("\r\n").count(), 2);
    }

    #[test]
    fn every_row_clears_to_end_of_line() {
        let f = frame(SIZE_3X20, Cursor::new());
        assert_eq!(f.matches("\x1b[K").count(), 3);
    }

    #[test]
    fn rows_carry_zero_padded_labels() {
        let f = frame(SIZE_3X20, Cursor::new());
        let rows: Vec<&str> = f.split("\r\n").collect();
        assert!(rows[0].contains("000"));
        assert!(rows[1].contains("001"));
        assert!(rows[2].contains("002"));
    }

    #[test]
    fn banner_is_truncated_on_narrow_terminals() {
        let f = frame(SIZE_3X20, Cursor::new());
        let row0 = f.split("\r\n").next().unwrap();
        assert!(row0.contains(&BANNER[..17]));
        assert!(!row0.contains(BANNER));
    }

    #[test]
    fn narrow_first_row_stays_within_the_terminal_width() {
        // Label plus banner must never exceed the column count, or the
        // terminal autowraps row 0 and shifts every following row down.
        let f = frame(SIZE_3X20, Cursor::new());
        let row0 = f.split("\r\n").next().unwrap();
        let cells = printable(row0);
        assert!(cells.len() <= 20, "row 0 overflows: {cells:?}");
        assert_eq!(cells, format!("000{}", &BANNER[..17]));
    }

    #[test]
    fn banner_is_centered_when_it_fits() {
        let size = Size { cols: 40, rows: 3 };
        let f = frame(size, Cursor::new());
        let row0 = f.split("\r\n").next().unwrap();
        // padding = (40 - banner) / 2, of which 3 cells are the row label.
        let padding = (40 - BANNER.len()) / 2;
        let expected = format!("000{}{}", " ".repeat(padding - 3), BANNER);
        assert!(row0.ends_with(&expected), "row 0 was {row0:?}");
    }

    #[test]
    fn last_row_shows_geometry_and_cursor() {
        let f = frame(SIZE_3X20, Cursor::at(1, 5));
        let last = f.split("\r\n").last().unwrap();
        assert!(last.contains("20x3"), "status row was {last:?}");
        assert!(last.contains("(1,5)"), "status row was {last:?}");
    }

    #[test]
    fn reposition_is_one_indexed() {
        let f = frame(SIZE_3X20, Cursor::at(1, 5));
        assert!(f.ends_with("\x1b[2;6H\x1b[?25h"));
    }

    #[test]
    fn reposition_tracks_the_cursor() {
        let f = frame(Size { cols: 80, rows: 24 }, Cursor::at(23, 79));
        assert!(f.ends_with("\x1b[24;80H\x1b[?25h"));
    }

    #[test]
    fn single_row_frame_has_no_separator() {
        let size = Size { cols: 10, rows: 1 };
        let f = frame(size, Cursor::new());
        assert!(!f.contains("\r\n"));
    }
}
