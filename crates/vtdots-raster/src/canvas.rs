// SPDX-License-Identifier: MIT
//
// Canvas — one drawing session on one terminal.
//
// The canvas owns two stencil buffers and swaps their roles every frame:
//
//   current   everything drawn since the last swap
//   previous  what the terminal shows right now
//
// `swap_buffers` diffs current against previous, sends the result in one
// write, then zeroes previous and makes it the new current. A frame is
// therefore always drawn from scratch; the diff keeps the output small.
//
// The swap is all-or-nothing. If the output buffer cannot grow or the
// write fails, both stencils and their roles are left as they were, so the
// next swap diffs against the frame the terminal really shows.
//
// Lifecycle:
//
//   Unconfigured ──reset──▶ Active ──close / drop──▶ Closed
//
// Drop restores the terminal best-effort if `close` was never called, so
// an early `?` return or a panic doesn't leave the user in raw mode on the
// alternate screen.
//
// Resizes are asynchronous. A signal handler (or any thread) raises the
// resize-pending flag through a `ResizeFlag` handle; the owner applies it
// with `resize` at a convenient point in its loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ansi;
use crate::diff::{self, DiffStats};
use crate::error::{Error, Result};
use crate::geometry::{Color, Size, Vertex};
use crate::output::SeqBuffer;
use crate::raster;
use crate::stencil::StencilBuffer;
use crate::terminal::Backend;

// ─── ResizeFlag ──────────────────────────────────────────────────────────────

/// Shared handle to a canvas's resize-pending flag.
///
/// Cheap to clone and safe to set from any thread.
#[derive(Debug, Clone, Default)]
pub struct ResizeFlag(Arc<AtomicBool>);

impl ResizeFlag {
    /// Request a resize on the next [`Canvas::resize`].
    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a resize is pending.
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unconfigured,
    Active,
    Closed,
}

// ─── Canvas ──────────────────────────────────────────────────────────────────

/// A double-buffered dot canvas bound to a terminal backend.
///
/// ```
/// use vtdots_raster::{Canvas, Color, MemoryBackend, Size};
///
/// let mut canvas = Canvas::new(MemoryBackend::new(Size::new(40, 12)))?;
/// canvas.reset()?;
/// canvas.scan_line_colored(0, 0, 79, 47, Color::Green);
/// let stats = canvas.swap_buffers()?;
/// assert!(stats.cells_emitted > 0);
/// canvas.close();
/// # Ok::<(), vtdots_raster::Error>(())
/// ```
pub struct Canvas<B: Backend> {
    backend: B,
    size: Size,
    stencils: [StencilBuffer; 2],
    /// Index of the stencil being drawn into.
    current: usize,
    out: SeqBuffer,
    output_limit: Option<usize>,
    resize: ResizeFlag,
    state: Lifecycle,
}

impl<B: Backend> Canvas<B> {
    /// Query the terminal size and allocate buffers for it.
    ///
    /// The terminal itself is left alone until [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the size query fails, or
    /// [`Error::OutOfMemory`] if the buffers cannot be allocated.
    pub fn new(mut backend: B) -> Result<Self> {
        let size = backend.query_size()?;
        let stencils = [StencilBuffer::new(size)?, StencilBuffer::new(size)?];
        let out = SeqBuffer::for_grid(size)?;

        tracing::debug!(%size, capacity = out.capacity(), "canvas created");

        Ok(Self {
            backend,
            size,
            stencils,
            current: 0,
            out,
            output_limit: None,
            resize: ResizeFlag::default(),
            state: Lifecycle::Unconfigured,
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Enter raw mode and switch to a blank alternate screen with the
    /// cursor hidden.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the mode change or the write fails. Once raw
    /// mode is on, the canvas restores it on close or drop even if the
    /// write failed.
    pub fn reset(&mut self) -> Result<()> {
        self.backend.enter_raw_mode()?;
        self.state = Lifecycle::Active;

        let mut seq = Vec::with_capacity(32);
        ansi::enter_alt_screen(&mut seq)?;
        ansi::cursor_hide(&mut seq)?;
        ansi::clear_screen(&mut seq)?;
        ansi::reset(&mut seq)?;
        self.backend.write_bytes(&seq)?;

        tracing::debug!(size = %self.size, "terminal reset");
        Ok(())
    }

    /// Restore the terminal and release the canvas.
    ///
    /// Failures are logged, not returned: there is nothing left to retry
    /// with.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.state == Lifecycle::Active {
            if let Err(e) = self.backend.restore_mode() {
                tracing::warn!(error = %e, "failed to restore terminal mode");
            }

            let mut seq = Vec::with_capacity(16);
            let written = ansi::exit_alt_screen(&mut seq)
                .and_then(|()| ansi::cursor_show(&mut seq))
                .and_then(|()| self.backend.write_bytes(&seq));
            if let Err(e) = written {
                tracing::warn!(error = %e, "failed to leave alternate screen");
            }

            tracing::debug!("terminal restored");
        }
        self.state = Lifecycle::Closed;
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Mark a resize as pending.
    #[inline]
    pub fn set_resize_pending(&self) {
        self.resize.set();
    }

    /// Whether a resize is pending.
    #[inline]
    #[must_use]
    pub fn is_resize_pending(&self) -> bool {
        self.resize.is_set()
    }

    /// A handle that can raise the resize flag from elsewhere.
    #[must_use]
    pub fn resize_flag(&self) -> ResizeFlag {
        self.resize.clone()
    }

    /// Apply a pending resize. Does nothing when none is pending.
    ///
    /// Both stencils come back blank at the new size and the screen is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the size query fails, or
    /// [`Error::OutOfMemory`] if the new buffers cannot be allocated. In
    /// both cases the canvas keeps its old buffers and the flag stays set.
    /// An error from clearing the screen is returned after the resize
    /// took effect.
    pub fn resize(&mut self) -> Result<()> {
        if !self.resize.is_set() {
            return Ok(());
        }

        let size = self.backend.query_size()?;
        let stencils = [StencilBuffer::new(size)?, StencilBuffer::new(size)?];
        let mut out = SeqBuffer::for_grid(size)?;
        out.set_limit(self.output_limit);

        tracing::debug!(from = %self.size, to = %size, "canvas resized");

        self.size = size;
        self.stencils = stencils;
        self.current = 0;
        self.out = out;
        self.resize.clear();

        self.clear_screen()
    }

    // ─── Dimensions ──────────────────────────────────────────────────────

    /// Canvas width in dots.
    #[inline]
    #[must_use]
    pub const fn width_dots(&self) -> u32 {
        self.size.width_dots()
    }

    /// Canvas height in dots.
    #[inline]
    #[must_use]
    pub const fn height_dots(&self) -> u32 {
        self.size.height_dots()
    }

    /// Rows of character cells.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.size.rows
    }

    /// Columns of character cells.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.size.cols
    }

    /// Cell grid size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// The stencil being drawn into.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &StencilBuffer {
        &self.stencils[self.current]
    }

    /// The stencil the terminal currently shows.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> &StencilBuffer {
        &self.stencils[1 - self.current]
    }

    #[inline]
    fn current_mut(&mut self) -> &mut StencilBuffer {
        &mut self.stencils[self.current]
    }

    /// Light one dot in the default color. Off-canvas dots are dropped.
    pub fn render_dot(&mut self, x: i32, y: i32) {
        self.render_dot_colored(x, y, Color::Default);
    }

    /// Light one dot. Off-canvas dots are dropped.
    pub fn render_dot_colored(&mut self, x: i32, y: i32, color: Color) {
        raster::point(self.current_mut(), i64::from(x), i64::from(y), color);
    }

    /// Draw a line in the default color, clipped to the canvas.
    pub fn scan_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.scan_line_colored(x0, y0, x1, y1, Color::Default);
    }

    /// Draw a line, clipped to the canvas.
    pub fn scan_line_colored(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        raster::line(
            self.current_mut(),
            (i64::from(x0), i64::from(y0)),
            (i64::from(x1), i64::from(y1)),
            color,
        );
    }

    /// Fill a convex polygon in the default color.
    ///
    /// # Errors
    ///
    /// See [`trace_polygon_colored`](Self::trace_polygon_colored).
    pub fn trace_polygon(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.trace_polygon_colored(vertices, Color::Default)
    }

    /// Fill a convex polygon. The last vertex connects back to the first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentWinding`] if the vertices do not keep
    /// one turning direction. Nothing is drawn in that case.
    pub fn trace_polygon_colored(&mut self, vertices: &[Vertex], color: Color) -> Result<()> {
        raster::polygon(self.current_mut(), vertices, color)
    }

    /// Overlay text on the cell grid, starting at `(row, col)` and cut off
    /// at the end of the row.
    ///
    /// Overlaid cells show the character instead of their dots. Anything
    /// but printable ASCII is shown as `?`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TextOutOfBounds`] if `(row, col)` is outside the
    /// grid. Nothing is written in that case.
    pub fn print_text(&mut self, row: u16, col: u16, text: &str) -> Result<()> {
        let Size { cols, rows } = self.size;
        if row >= rows || col >= cols {
            return Err(Error::TextOutOfBounds { row, col, rows, cols });
        }

        let sb = self.current_mut();
        for (c, ch) in (col..cols).zip(text.chars()) {
            let byte = u8::try_from(ch)
                .ok()
                .filter(|b| b.is_ascii_graphic() || *b == b' ')
                .unwrap_or(b'?');
            sb.print_char(row, c, byte);
        }
        Ok(())
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Clear the terminal screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails.
    pub fn clear_screen(&mut self) -> Result<()> {
        let mut seq = Vec::with_capacity(4);
        ansi::clear_screen(&mut seq)?;
        self.backend.write_bytes(&seq)?;
        Ok(())
    }

    /// Send the frame drawn since the last swap and start a blank one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the output buffer cannot grow, or
    /// [`Error::Io`] if the write fails. Either way nothing changes: the
    /// drawn frame is kept and can be swapped again.
    pub fn swap_buffers(&mut self) -> Result<DiffStats> {
        let (current, previous) = (&self.stencils[self.current], &self.stencils[1 - self.current]);
        let stats = diff::encode(current, previous, &mut self.out)?;
        self.backend.write_bytes(self.out.as_bytes())?;

        let previous = 1 - self.current;
        self.stencils[previous].clear();
        self.current = previous;

        Ok(stats)
    }

    /// Cap how far the output buffer may grow, in bytes. Growth past the
    /// cap fails like an allocation failure. `None` removes the cap.
    pub fn set_output_limit(&mut self, limit: Option<usize>) {
        self.output_limit = limit;
        self.out.set_limit(limit);
    }

    /// Current output buffer capacity in bytes.
    #[inline]
    #[must_use]
    pub fn output_capacity(&self) -> usize {
        self.out.capacity()
    }

    // ─── Backend ─────────────────────────────────────────────────────────

    /// The backend.
    #[inline]
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    #[inline]
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: Backend> Drop for Canvas<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<B: Backend> std::fmt::Debug for Canvas<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("size", &self.size)
            .field("state", &self.state)
            .field("resize_pending", &self.resize.is_set())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
