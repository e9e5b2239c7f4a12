// SPDX-License-Identifier: MIT
//
// Diff encoder — turns two stencils into the bytes that update the screen.
//
// The current stencil is compared against the one that was last flushed,
// cell by cell in row-major order, and only cells that changed are emitted.
// Between two emitted cells that sit next to each other the terminal's own
// cursor advance does the positioning; a cursor move is written only after
// one or more cells were skipped.
//
// Per cell:
//
//   overlay unchanged, and either overlaid or dots unchanged → skip
//   not overlaid                                             → color + glyph
//   overlaid, overlay changed                                → default color + byte
//
// A cell whose overlay was just removed takes the "not overlaid" path, so
// the dots underneath are redrawn even if they did not change.
//
// The color is tracked across the frame and a color escape is written only
// when the next glyph needs a different one. The stream always opens with
// the default color, so the tracked state starts out true no matter what
// the previous frame left behind.

use crate::ansi;
use crate::error::Result;
use crate::geometry::Color;
use crate::output::SeqBuffer;
use crate::stencil::StencilBuffer;

// ─── DiffStats ───────────────────────────────────────────────────────────────

/// Statistics from one encode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    /// Cells that differed from the previous frame and were emitted.
    pub cells_emitted: usize,
    /// Cells that were left alone.
    pub cells_skipped: usize,
    /// Total bytes of the encoded stream.
    pub bytes: usize,
}

impl DiffStats {
    /// Total cells visited (emitted + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_emitted + self.cells_skipped
    }
}

// ─── Encoder ─────────────────────────────────────────────────────────────────

/// Encode the changes from `previous` to `current` into `out`.
///
/// `out` is cleared first. Both stencils must have the same size. Neither
/// stencil is modified, so a failed encode can simply be retried.
///
/// # Errors
///
/// Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) if `out` cannot
/// grow enough to hold the stream. `out` then holds a partial stream that
/// must not be sent.
pub fn encode(
    current: &StencilBuffer,
    previous: &StencilBuffer,
    out: &mut SeqBuffer,
) -> Result<DiffStats> {
    debug_assert_eq!(current.size(), previous.size());

    out.clear();
    out.ensure_slack()?;
    ansi::fg(out, Color::Default)?;

    let size = current.size();
    let cols = usize::from(size.cols);
    let mut stats = DiffStats::default();
    let mut color = Color::Default.index();
    let mut cursor_dirty = true;

    let cells = current
        .masks()
        .iter()
        .zip(current.colors())
        .zip(current.overlay())
        .zip(previous.masks().iter().zip(previous.colors()).zip(previous.overlay()));

    for (idx, (((&mask, &fg), &text), ((&prev_mask, &prev_fg), &prev_text))) in
        cells.enumerate()
    {
        let overlaid = text != 0;
        let text_diff = text != prev_text;
        let cell_diff = mask != prev_mask || fg != prev_fg;

        if !text_diff && (overlaid || !cell_diff) {
            cursor_dirty = true;
            stats.cells_skipped += 1;
            continue;
        }

        out.ensure_slack()?;

        if cursor_dirty {
            // idx < rows × cols, both u16, so row and col fit.
            #[allow(clippy::cast_possible_truncation)]
            let (row, col) = ((idx / cols) as u16, (idx % cols) as u16);
            ansi::cursor_to(out, row + 1, col + 1)?;
            cursor_dirty = false;
        }

        if overlaid {
            if color != Color::Default.index() {
                ansi::fg(out, Color::Default)?;
                color = Color::Default.index();
            }
            out.push(text);
        } else {
            if fg != color {
                ansi::fg(out, Color::from_index(fg))?;
                color = fg;
            }
            out.push_bytes(&mask.glyph());
        }

        stats.cells_emitted += 1;
    }

    stats.bytes = out.len();
    Ok(stats)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dot::DotMask;
    use crate::error::Error;
    use crate::geometry::Size;

    fn buf(cols: u16, rows: u16) -> StencilBuffer {
        StencilBuffer::new(Size::new(cols, rows)).unwrap()
    }

    fn encode_str(current: &StencilBuffer, previous: &StencilBuffer) -> (DiffStats, String) {
        let mut out = SeqBuffer::for_grid(current.size()).unwrap();
        let stats = encode(current, previous, &mut out).unwrap();
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        (stats, s)
    }

    // ── Unchanged frames ──────────────────────────────────────────────

    #[test]
    fn identical_blank_frames_emit_only_default_color() {
        let a = buf(10, 4);
        let b = buf(10, 4);
        let (stats, s) = encode_str(&a, &b);
        assert_eq!(s, "\x1b[39m");
        assert_eq!(stats.cells_emitted, 0);
        assert_eq!(stats.cells_skipped, 40);
        assert_eq!(stats.bytes, 5);
    }

    #[test]
    fn identical_drawn_frames_emit_only_default_color() {
        let mut a = buf(6, 3);
        a.render_dot(3, 5, Color::Red);
        a.print_char(2, 2, b'x');
        let b = a.clone();
        let (_, s) = encode_str(&a, &b);
        assert_eq!(s, "\x1b[39m");
    }

    #[test]
    fn zero_size_grid() {
        let a = buf(0, 0);
        let (stats, s) = encode_str(&a, &a.clone());
        assert_eq!(s, "\x1b[39m");
        assert_eq!(stats.total_cells(), 0);
    }

    // ── Dots ──────────────────────────────────────────────────────────

    #[test]
    fn single_dot_positions_cursor_and_draws_glyph() {
        let prev = buf(20, 10);
        for (x, y) in [(0, 0), (7, 13), (39, 39), (14, 2)] {
            let mut cur = buf(20, 10);
            cur.render_dot(x, y, Color::Default);
            let (stats, s) = encode_str(&cur, &prev);

            let glyph = crate::dot::Dot::at(x, y).mask().glyph();
            let expected = format!(
                "\x1b[39m\x1b[{};{}H{}",
                y / 4 + 1,
                x / 2 + 1,
                std::str::from_utf8(&glyph).unwrap()
            );
            assert_eq!(s, expected);
            assert_eq!(stats.cells_emitted, 1);
        }
    }

    #[test]
    fn adjacent_cells_share_one_cursor_move() {
        let prev = buf(4, 1);
        let mut cur = buf(4, 1);
        cur.render_dot(2, 0, Color::Default);
        cur.render_dot(4, 0, Color::Default);
        let (stats, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;2H⠁⠁");
        assert_eq!(stats.cells_emitted, 2);
    }

    #[test]
    fn gap_forces_new_cursor_move() {
        let prev = buf(4, 2);
        let mut cur = buf(4, 2);
        cur.render_dot(0, 0, Color::Default);
        cur.render_dot(6, 4, Color::Default);
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;1H⠁\x1b[2;4H⠁");
    }

    #[test]
    fn erased_dot_is_redrawn_blank() {
        let mut prev = buf(3, 1);
        prev.render_dot(2, 0, Color::Default);
        let cur = buf(3, 1);
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;2H\u{2800}");
    }

    // ── Colors ────────────────────────────────────────────────────────

    #[test]
    fn color_escape_only_on_change() {
        let prev = buf(3, 1);
        let mut cur = buf(3, 1);
        cur.render_dot(0, 0, Color::Red);
        cur.render_dot(2, 0, Color::Red);
        cur.render_dot(4, 0, Color::Blue);
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;1H\x1b[31m⠁⠁\x1b[34m⠁");
    }

    #[test]
    fn color_only_change_is_emitted() {
        let mut prev = buf(1, 1);
        prev.render_dot(0, 0, Color::Red);
        let mut cur = buf(1, 1);
        cur.render_dot(0, 0, Color::Green);
        let (stats, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;1H\x1b[32m⠁");
        assert_eq!(stats.cells_emitted, 1);
    }

    // ── Overlay ───────────────────────────────────────────────────────

    #[test]
    fn new_overlay_resets_color_before_character() {
        let prev = buf(4, 1);
        let mut cur = buf(4, 1);
        cur.render_dot(0, 0, Color::Cyan);
        cur.print_char(0, 1, b'A');
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;1H\x1b[36m⠁\x1b[39mA");
    }

    #[test]
    fn unchanged_overlay_hides_dot_changes() {
        let mut prev = buf(2, 1);
        prev.print_char(0, 0, b'Z');
        let mut cur = buf(2, 1);
        cur.print_char(0, 0, b'Z');
        cur.render_dot(0, 0, Color::Red);
        let (stats, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m");
        assert_eq!(stats.cells_skipped, 2);
    }

    #[test]
    fn removed_overlay_redraws_dots_underneath() {
        let mut prev = buf(2, 1);
        prev.print_char(0, 1, b'Q');
        prev.render_dot(2, 0, Color::Default);
        let mut cur = buf(2, 1);
        cur.render_dot(2, 0, Color::Default);
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;2H⠁");
    }

    #[test]
    fn default_color_overlay_needs_no_escape() {
        let prev = buf(2, 1);
        let mut cur = buf(2, 1);
        cur.print_char(0, 0, b'h');
        cur.print_char(0, 1, b'i');
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;1Hhi");
    }

    // ── Growth ────────────────────────────────────────────────────────

    #[test]
    fn small_sink_grows_to_fit_full_frame() {
        let prev = buf(40, 20);
        let mut cur = buf(40, 20);
        for y in 0..80 {
            for x in 0..80 {
                let color = Color::from_index(u8::try_from((x + y) % 9).unwrap());
                cur.render_dot(x, y, color);
            }
        }
        let mut out = SeqBuffer::with_capacity(16).unwrap();
        let stats = encode(&cur, &prev, &mut out).unwrap();
        assert_eq!(stats.cells_emitted, 800);
        assert_eq!(stats.bytes, out.len());
        assert!(out.capacity() >= out.len());

        let text = std::str::from_utf8(out.as_bytes()).unwrap();
        assert_eq!(text.chars().filter(|&c| c == '\u{28FF}').count(), 800);
    }

    #[test]
    fn growth_limit_reports_oom() {
        let prev = buf(40, 20);
        let mut cur = buf(40, 20);
        for y in (0..80).step_by(4) {
            for x in (0..80).step_by(4) {
                cur.render_dot(x, y, Color::Red);
            }
        }
        let mut out = SeqBuffer::with_capacity(64).unwrap();
        out.set_limit(Some(256));
        let err = encode(&cur, &prev, &mut out).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { .. }));
    }

    // ── Stats ─────────────────────────────────────────────────────────

    #[test]
    fn stats_count_every_cell() {
        let prev = buf(5, 5);
        let mut cur = buf(5, 5);
        cur.render_dot(0, 0, Color::Default);
        cur.render_dot(9, 19, Color::Default);
        let (stats, s) = encode_str(&cur, &prev);
        assert_eq!(stats.cells_emitted, 2);
        assert_eq!(stats.total_cells(), 25);
        assert_eq!(stats.bytes, s.len());
    }

    #[test]
    fn full_mask_uses_last_braille_glyph() {
        let prev = buf(1, 1);
        let mut cur = buf(1, 1);
        for y in 0..4 {
            for x in 0..2 {
                cur.render_dot(x, y, Color::Default);
            }
        }
        assert_eq!(cur.mask_at(0, 0), Some(DotMask::all()));
        let (_, s) = encode_str(&cur, &prev);
        assert_eq!(s, "\x1b[39m\x1b[1;1H\u{28FF}");
    }
}
