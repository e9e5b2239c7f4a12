// SPDX-License-Identifier: MIT
//
// Escape codes for the few VT commands a dot canvas uses.
//
// Each function appends one sequence to a writer and nothing else. When to
// send which sequence is decided by the canvas and the diff encoder.
//
// Cursor positions here are the terminal's own 1-indexed coordinates: the
// diff encoder walks rows and columns starting from 1.

use std::io::{self, Write};

use crate::geometry::Color;

/// Longest cursor-position sequence: `ESC [ 65535 ; 65535 H`.
pub const MAX_CURSOR_TO_LEN: usize = 13;

/// Length of a foreground color sequence: `ESC [ 3 N m`.
pub const FG_LEN: usize = 5;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(row, col)`, both 1-indexed (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, row: u16, col: u16) -> io::Result<()> {
    write!(w, "\x1b[{row};{col}H")
}

/// `ESC[?25l`: cursor invisible.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// `ESC[?25h`: cursor visible.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// `ESC[2J`: erase the whole display.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// `ESC[0m`: drop every graphic rendition.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// The foreground color sequence as bytes (`ESC[39m` for `Default`,
/// `ESC[30m`–`ESC[37m` for the palette).
#[inline]
#[must_use]
pub const fn fg_bytes(color: Color) -> [u8; FG_LEN] {
    [0x1b, b'[', b'3', color.sgr_digit(), b'm']
}

/// Write the sequence from [`fg_bytes`].
#[inline]
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    w.write_all(&fg_bytes(color))
}

// ─── Alternate screen ────────────────────────────────────────────────────────

/// `ESC[?1049h`: switch to the alternate screen. The shell's screen
/// comes back on [`exit_alt_screen`].
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// `ESC[?1049l`: back to the normal screen.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
