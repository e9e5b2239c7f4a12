// SPDX-License-Identifier: MIT
//
// Spinning polygons — a filled hexagon and triangle turning in opposite
// directions around the canvas center, with an outlined square on top and
// a text overlay in the corner. Runs until interrupted.

use std::f32::consts::TAU;
use std::time::Duration;

use vtdots_raster::event_loop::{Action, Scene};
use vtdots_raster::{Backend, Canvas, Color, Result, Vertex};

/// Radians per second for the hexagon; the triangle turns the other way.
const ANGULAR_SPEED: f32 = 0.8;

/// Vertices of a regular polygon, rounded to dots.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn regular_polygon(cx: f32, cy: f32, radius: f32, sides: u32, phase: f32) -> Vec<Vertex> {
    (0..sides)
        .map(|i| {
            let a = phase + TAU * i as f32 / sides as f32;
            Vertex::new((cx + radius * a.cos()).round() as i32, (cy + radius * a.sin()).round() as i32)
        })
        .collect()
}

/// The spinning polygons scene.
#[derive(Debug, Default)]
pub struct Spin {
    center: (f32, f32),
    radius: f32,
    frames: u64,
}

impl Spin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scene for Spin {
    #[allow(clippy::cast_precision_loss)]
    fn on_resize(&mut self, width_dots: u32, height_dots: u32) {
        self.center = (width_dots as f32 / 2.0, height_dots as f32 / 2.0);
        self.radius = width_dots.min(height_dots) as f32 * 0.45;
    }

    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, elapsed: Duration) -> Result<Action> {
        let t = elapsed.as_secs_f32() * ANGULAR_SPEED;
        let (cx, cy) = self.center;

        let hexagon = regular_polygon(cx, cy, self.radius, 6, t);
        canvas.trace_polygon_colored(&hexagon, Color::Cyan)?;

        let triangle = regular_polygon(cx, cy, self.radius * 0.5, 3, -t);
        canvas.trace_polygon_colored(&triangle, Color::Yellow)?;

        let square = regular_polygon(cx, cy, self.radius * 0.75, 4, t * 0.5);
        for (a, b) in square.iter().zip(square.iter().cycle().skip(1)) {
            canvas.scan_line_colored(a.x, a.y, b.x, b.y, Color::Magenta);
        }

        self.frames += 1;
        if canvas.rows() > 0 && canvas.cols() > 0 {
            canvas.print_text(0, 0, &format!("vtdots spin | frame {}", self.frames))?;
        }

        Ok(Action::Continue)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use vtdots_raster::{MemoryBackend, Size};

    #[test]
    fn regular_polygon_vertices() {
        let square = regular_polygon(10.0, 10.0, 5.0, 4, 0.0);
        assert_eq!(
            square,
            vec![Vertex::new(15, 10), Vertex::new(10, 15), Vertex::new(5, 10), Vertex::new(10, 5)]
        );
    }

    #[test]
    fn frame_draws_shapes_and_label() {
        let mut canvas = Canvas::new(MemoryBackend::new(Size::new(40, 12))).unwrap();
        let mut scene = Spin::new();
        scene.on_resize(canvas.width_dots(), canvas.height_dots());

        for ms in [0, 250, 1300, 4000] {
            scene.frame(&mut canvas, Duration::from_millis(ms)).unwrap();
            assert!(canvas.current().is_lit(40, 24));
            assert_eq!(canvas.current().overlay_at(0, 0), Some(b'v'));
            canvas.swap_buffers().unwrap();
        }
    }

    #[test]
    fn zero_size_canvas_is_harmless() {
        let mut canvas = Canvas::new(MemoryBackend::new(Size::new(0, 0))).unwrap();
        let mut scene = Spin::new();
        scene.on_resize(0, 0);
        assert_eq!(scene.frame(&mut canvas, Duration::ZERO).unwrap(), Action::Continue);
    }
}
