// SPDX-License-Identifier: MIT
//
// Public contract of the canvas, observed through the bytes it writes.

use pretty_assertions::assert_eq;
use vtdots_raster::dot::Dot;
use vtdots_raster::{Canvas, Color, Error, MemoryBackend, Size, Vertex};

fn canvas(cols: u16, rows: u16) -> Canvas<MemoryBackend> {
    Canvas::new(MemoryBackend::new(Size::new(cols, rows))).unwrap()
}

fn swap(c: &mut Canvas<MemoryBackend>) -> String {
    c.swap_buffers().unwrap();
    String::from_utf8(c.backend().last_write().unwrap().to_vec()).unwrap()
}

fn lit(c: &Canvas<MemoryBackend>) -> Vec<(u32, u32)> {
    let mut dots = Vec::new();
    for y in 0..c.height_dots() {
        for x in 0..c.width_dots() {
            if c.current().is_lit(x, y) {
                dots.push((x, y));
            }
        }
    }
    dots
}

// ── Dots ──────────────────────────────────────────────────────────────

#[test]
fn single_dot_frame_for_every_position_in_a_cell() {
    for y in 0..8 {
        for x in 0..4 {
            let mut c = canvas(2, 2);
            c.render_dot(x, y);
            let glyph = Dot::at(x.unsigned_abs(), y.unsigned_abs()).mask().glyph();
            let expected = format!(
                "\x1b[39m\x1b[{};{}H{}",
                y / 4 + 1,
                x / 2 + 1,
                std::str::from_utf8(&glyph).unwrap()
            );
            assert_eq!(swap(&mut c), expected);
        }
    }
}

#[test]
fn repeated_dot_is_idempotent() {
    let mut once = canvas(8, 4);
    let mut twice = canvas(8, 4);
    once.render_dot_colored(5, 7, Color::Yellow);
    twice.render_dot_colored(5, 7, Color::Yellow);
    twice.render_dot_colored(5, 7, Color::Yellow);
    assert_eq!(once.current(), twice.current());
    assert_eq!(swap(&mut once), swap(&mut twice));
}

// ── Lines ─────────────────────────────────────────────────────────────

#[test]
fn line_entirely_outside_renders_nothing() {
    let mut c = canvas(10, 5);
    c.scan_line(-50, -50, -5, -1);
    c.scan_line(20, 0, 100, 19);
    c.scan_line(0, 20, 19, 40);
    assert!(c.current().is_blank());
    assert_eq!(swap(&mut c), "\x1b[39m");
}

#[test]
fn boundary_crossing_line_keeps_only_visible_dots() {
    // Same slope drawn on a bigger canvas, shifted so nothing is clipped.
    let mut small = canvas(10, 3);
    small.scan_line(-4, -2, 16, 8);

    let mut big = canvas(30, 9);
    big.scan_line(8, 8, 28, 18);

    let expected: Vec<_> = lit(&big)
        .into_iter()
        .filter_map(|(x, y)| {
            let (x, y) = (x.checked_sub(12)?, y.checked_sub(10)?);
            (x < 20 && y < 12).then_some((x, y))
        })
        .collect();

    assert!(!expected.is_empty());
    assert_eq!(lit(&small), expected);
}

#[test]
fn line_entering_between_dots_keeps_its_slope() {
    // Crosses x = 0 at y = 3/11, so the visible part starts off-grid.
    let mut small = canvas(10, 2);
    small.scan_line(-1, 0, 10, 3);

    let mut big = canvas(20, 4);
    big.scan_line(7, 8, 18, 11);

    let expected: Vec<_> = lit(&big)
        .into_iter()
        .filter_map(|(x, y)| {
            let (x, y) = (x.checked_sub(8)?, y.checked_sub(8)?);
            (x < 20 && y < 8).then_some((x, y))
        })
        .collect();

    assert_eq!(lit(&small), expected);
    assert!(small.current().is_lit(1, 1));
    assert!(!small.current().is_lit(1, 0));
}

#[test]
fn steep_line_leaving_between_dots_keeps_its_slope() {
    let mut small = canvas(3, 2);
    small.scan_line(1, -2, 4, 9);

    let mut big = canvas(10, 6);
    big.scan_line(6, 3, 9, 14);

    let expected: Vec<_> = lit(&big)
        .into_iter()
        .filter_map(|(x, y)| {
            let (x, y) = (x.checked_sub(5)?, y.checked_sub(5)?);
            (x < 6 && y < 8).then_some((x, y))
        })
        .collect();

    assert!(!expected.is_empty());
    assert_eq!(lit(&small), expected);
}

#[test]
fn horizontal_line_has_nine_dots() {
    let mut c = canvas(8, 2);
    c.scan_line(2, 5, 10, 5);
    assert_eq!(lit(&c), (2..=10).map(|x| (x, 5)).collect::<Vec<_>>());
}

#[test]
fn diagonal_steps_one_by_one() {
    let mut c = canvas(10, 4);
    c.scan_line(15, 2, 3, 14);
    let dots = lit(&c);
    assert_eq!(dots.len(), 13);
    for w in dots.windows(2) {
        assert_eq!(w[1].1, w[0].1 + 1);
        assert_eq!(w[1].0 + 1, w[0].0);
    }
}

// ── Polygons ──────────────────────────────────────────────────────────

#[test]
fn triangle_midline_span() {
    let mut c = canvas(6, 3);
    let tri = [(0, 0), (10, 0), (5, 10)].map(Vertex::from);
    c.trace_polygon(&tri).unwrap();

    let row: Vec<u32> = lit(&c).into_iter().filter(|&(_, y)| y == 5).map(|(x, _)| x).collect();
    assert_eq!(row, (2..=7).collect::<Vec<_>>());
}

#[test]
fn broken_winding_is_rejected_without_drawing() {
    let mut c = canvas(6, 3);
    let bad = [(0, 0), (10, 0), (5, 10), (6, -3)].map(Vertex::from);
    let err = c.trace_polygon_colored(&bad, Color::Red).unwrap_err();
    assert!(matches!(err, Error::InconsistentWinding { .. }));
    assert!(err.is_input_error());
    assert!(c.current().is_blank());
}

#[test]
fn polygon_tip_and_base_rows() {
    let mut c = canvas(8, 4);
    let diamond = [(6, 0), (12, 6), (6, 12), (0, 6)].map(Vertex::from);
    c.trace_polygon(&diamond).unwrap();

    let dots = lit(&c);
    let row = |y| dots.iter().filter(|d| d.1 == y).map(|d| d.0).collect::<Vec<_>>();
    assert_eq!(row(0), vec![6]);
    assert_eq!(row(12), vec![6]);
    assert_eq!(row(6), (0..=12).collect::<Vec<_>>());
}

// ── Swapping ──────────────────────────────────────────────────────────

#[test]
fn empty_swaps_after_an_empty_frame_are_minimal() {
    let mut c = canvas(12, 6);
    assert_eq!(swap(&mut c), "\x1b[39m");
    assert_eq!(swap(&mut c), "\x1b[39m");
}

#[test]
fn swap_leaves_a_blank_current_stencil() {
    let mut c = canvas(12, 6);
    c.scan_line(0, 0, 23, 23);
    c.print_text(2, 2, "text").unwrap();
    swap(&mut c);
    assert!(c.current().is_blank());
}

#[test]
fn every_swap_is_one_write() {
    let mut c = canvas(20, 10);
    for i in 0..5 {
        c.scan_line(i, 0, 39 - i, 39);
        c.swap_buffers().unwrap();
    }
    assert_eq!(c.backend().writes().len(), 5);
}

#[test]
fn big_frame_grows_output_buffer() {
    let mut c = canvas(60, 20);
    let initial = c.output_capacity();
    for y in 0..80 {
        for x in 0..120 {
            let color = Color::PALETTE[usize::try_from((x + y) % 8).unwrap()];
            c.render_dot_colored(x, y, color);
        }
    }
    let stats = c.swap_buffers().unwrap();
    assert_eq!(stats.cells_emitted, 1200);
    assert!(c.output_capacity() >= stats.bytes);
    assert!(c.output_capacity() >= initial);
}

// ── Overlay ───────────────────────────────────────────────────────────

#[test]
fn overlay_hides_dots_until_removed() {
    let mut c = canvas(4, 1);
    c.render_dot_colored(2, 0, Color::Red);
    c.print_text(0, 1, "@").unwrap();
    assert_eq!(swap(&mut c), "\x1b[39m\x1b[1;2H@");

    // Same overlay, different dots underneath: nothing to send.
    c.render_dot_colored(3, 3, Color::Blue);
    c.print_text(0, 1, "@").unwrap();
    assert_eq!(swap(&mut c), "\x1b[39m");

    // Overlay gone: the dots are drawn.
    c.render_dot_colored(3, 3, Color::Blue);
    assert_eq!(swap(&mut c), "\x1b[39m\x1b[1;2H\x1b[34m⢀");
}

// ── Resize ────────────────────────────────────────────────────────────

#[test]
fn resize_cycle_through_shared_flag() {
    let mut c = canvas(10, 5);
    let flag = c.resize_flag();

    c.resize().unwrap();
    assert_eq!(c.size(), Size::new(10, 5));

    c.backend_mut().set_size(Size::new(20, 10));
    flag.set();
    c.resize().unwrap();
    assert!(!flag.is_set());
    assert_eq!((c.width_dots(), c.height_dots()), (40, 40));

    c.render_dot(39, 39);
    assert_eq!(swap(&mut c), "\x1b[39m\x1b[10;20H⢀");
}
