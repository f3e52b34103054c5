// SPDX-License-Identifier: MIT
//
// Output buffering — one frame, one write.
//
// The RenderBuffer accumulates all ANSI bytes for a frame in memory so the
// whole screen update goes out in a single write() syscall. Writing escape
// sequences piecemeal lets the terminal repaint between them, which shows
// up as tearing and cursor flicker. Batching eliminates that: the terminal
// receives the frame atomically.

use std::io::{self, Write};

/// A byte buffer that accumulates one frame for a single `write()` syscall.
///
/// Append-only during a render pass; [`flush_to`](Self::flush_to) writes the
/// entire content in one operation and resets the buffer. There is no
/// partial-flush API.
///
/// # Allocation failure
///
/// [`append`](Self::append) is a silent no-op when the buffer cannot grow:
/// the frame renders degraded rather than killing the editor over a failed
/// allocation. Documented soft-failure policy; whether dropped output should
/// instead be fatal is an open question we have not resolved.
pub struct RenderBuffer {
    buf: Vec<u8>,
}

/// Enough for a full frame on a large terminal without reallocation.
const DEFAULT_CAPACITY: usize = 4096;

impl RenderBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append bytes, growing the buffer by exactly `bytes.len()`.
    ///
    /// If the buffer cannot grow, the bytes are dropped and prior content
    /// is left unchanged (see the type-level note on allocation failure).
    pub fn append(&mut self, bytes: &[u8]) {
        if self.buf.try_reserve(bytes.len()).is_ok() {
            self.buf.extend_from_slice(bytes);
        }
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the accumulated frame to `w` in one operation, then reset.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for RenderBuffer {
    /// Routes through [`append`](Self::append), including its soft-failure
    /// policy — a dropped write still reports `buf.len()` consumed.
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
