// SPDX-License-Identifier: MIT
//
// Output buffering — the growable byte sink behind every frame.
//
// All escape sequences and glyphs of a frame are accumulated here so the
// whole frame reaches the terminal in a single write. The sink is sized up
// front for a typical full-screen frame and grows by doubling when a frame
// turns out bigger.
//
// The discipline is "check, then write": before a writer emits one unit of
// output (at most one cursor move, one color change and one glyph) it calls
// `ensure_slack`, which guarantees at least `MIN_SLACK` free bytes. Growth
// goes through `try_reserve_exact`, so running out of memory is an error
// the caller can act on, not an abort in the middle of a sequence.

use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::geometry::Size;

/// Free space guaranteed by [`SeqBuffer::ensure_slack`].
///
/// One diff step writes at most a cursor move (13 bytes), a color change
/// (5 bytes) and a glyph (3 bytes). The slack is well above that.
pub const MIN_SLACK: usize = 64;

/// Bytes reserved per cell for a fresh sink: a glyph plus a color change,
/// with one extra row's worth for cursor moves.
const BYTES_PER_CELL: usize = 9;

/// A byte buffer with explicit, fallible, doubling growth.
pub struct SeqBuffer {
    buf: Vec<u8>,
    /// Largest capacity growth may reach. Exceeding it is reported as
    /// out-of-memory, exactly like a failed allocation.
    limit: Option<usize>,
}

impl SeqBuffer {
    /// Initial capacity for a `size` cell grid.
    #[must_use]
    pub fn initial_capacity(size: Size) -> usize {
        let rows = usize::from(size.rows);
        let cols = usize::from(size.cols);
        (((rows + 1) * cols + 1) * BYTES_PER_CELL).max(MIN_SLACK)
    }

    /// Create an empty sink holding at least `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the allocation fails.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|e| Error::oom(capacity, e))?;
        Ok(Self { buf, limit: None })
    }

    /// Create an empty sink sized for a `size` cell grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the allocation fails.
    pub fn for_grid(size: Size) -> Result<Self> {
        Self::with_capacity(Self::initial_capacity(size))
    }

    // ─── Accessors ───────────────────────────────────────────────────────

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

    /// Allocated capacity. Never shrinks.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Free bytes before the next growth.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.capacity() - self.buf.len()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Cap the capacity growth may reach (`None` = unbounded).
    pub const fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // ─── Growth ──────────────────────────────────────────────────────────

    /// Make sure more than [`MIN_SLACK`] bytes are free, doubling the
    /// capacity as often as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if growing fails or would pass the
    /// configured limit. The buffer is left as it was.
    pub fn ensure_slack(&mut self) -> Result<()> {
        while self.remaining() <= MIN_SLACK {
            self.grow()?;
        }
        Ok(())
    }

    /// Double the capacity.
    fn grow(&mut self) -> Result<()> {
        let current = self.buf.capacity().max(MIN_SLACK);
        let target = current.checked_mul(2).ok_or_else(|| Error::over_limit(usize::MAX))?;

        if self.limit.is_some_and(|limit| target > limit) {
            return Err(Error::over_limit(target));
        }

        self.buf
            .try_reserve_exact(target - self.buf.len())
            .map_err(|e| Error::oom(target, e))?;

        tracing::trace!(capacity = self.buf.capacity(), "output buffer grown");
        Ok(())
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Append bytes. The caller must have made room with
    /// [`ensure_slack`](Self::ensure_slack).
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.remaining(), "write past capacity");
        self.buf.extend_from_slice(bytes);
    }

    /// Append one byte. Same contract as [`push_bytes`](Self::push_bytes).
    #[inline]
    pub fn push(&mut self, byte: u8) {
        debug_assert!(self.remaining() > 0, "write past capacity");
        self.buf.push(byte);
    }
}

impl Write for SeqBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing to flush: the canvas hands `as_bytes()` to its backend.
        Ok(())
    }
}

impl std::fmt::Debug for SeqBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqBuffer")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .field("limit", &self.limit)
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
