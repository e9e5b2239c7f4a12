// SPDX-License-Identifier: MIT
//
// Clip test — sweeps dots, lines and triangles across the canvas edges so
// clipping artifacts (stray dots, wrapped rows, missing end points) show up
// immediately. Runs through its stages once, then quits.

use std::time::Duration;

use vtdots_raster::event_loop::{Action, Scene};
use vtdots_raster::{Backend, Canvas, Result, Vertex};

use super::extent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Two dots outside the canvas: the frame must stay empty.
    Dots,
    /// Triangle falling from above the top edge to below the bottom.
    TriangleDown,
    /// Triangle moving from the left edge past the right.
    TriangleRight,
    /// Vertical line, one dot longer than the canvas at both ends.
    Vertical,
    /// Horizontal line, one dot wider than the canvas at both ends.
    Horizontal,
    /// Steep line sliding sideways.
    SlopedAcross,
    /// Shallow line sliding downwards.
    SlopedDown,
    /// Half-canvas segments sweeping down in four columns.
    HalfSegments,
}

impl Stage {
    const fn next(self) -> Option<Self> {
        match self {
            Self::Dots => Some(Self::TriangleDown),
            Self::TriangleDown => Some(Self::TriangleRight),
            Self::TriangleRight => Some(Self::Vertical),
            Self::Vertical => Some(Self::Horizontal),
            Self::Horizontal => Some(Self::SlopedAcross),
            Self::SlopedAcross => Some(Self::SlopedDown),
            Self::SlopedDown => Some(Self::HalfSegments),
            Self::HalfSegments => None,
        }
    }

    /// Number of frames this stage takes on a `w × h` dot canvas.
    fn steps(self, w: i32, h: i32) -> i32 {
        match self {
            Self::Dots => 1,
            Self::TriangleDown => h + 10,
            Self::TriangleRight => w + 10,
            Self::Vertical => w + 2,
            Self::Horizontal => h + 2,
            Self::SlopedAcross => w + 51,
            Self::SlopedDown => h + 51,
            Self::HalfSegments => half_segment_columns(w) * h,
        }
    }
}

fn half_segment_columns(w: i32) -> i32 {
    let quarter = (w / 4).max(1);
    (w + quarter - 1) / quarter
}

/// The clip test scene.
#[derive(Debug)]
pub struct ClipTest {
    stage: Stage,
    step: i32,
}

impl ClipTest {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: Stage::Dots,
            step: 0,
        }
    }

    fn draw<B: Backend>(&self, canvas: &mut Canvas<B>, w: i32, h: i32) -> Result<()> {
        let s = self.step;
        match self.stage {
            Stage::Dots => {
                canvas.render_dot(-1, -1);
                canvas.render_dot(i32::from(u16::MAX), i32::from(u16::MAX));
            }
            Stage::TriangleDown => {
                let y = s;
                canvas.trace_polygon(&[(50, y - 10), (45, y), (55, y)].map(Vertex::from))?;
            }
            Stage::TriangleRight => {
                let x = s;
                canvas.trace_polygon(&[(x - 10, 50), (x, 45), (x, 55)].map(Vertex::from))?;
            }
            Stage::Vertical => {
                let x = s - 1;
                canvas.scan_line(x, -1, x, h);
            }
            Stage::Horizontal => {
                let y = s - 1;
                canvas.scan_line(-1, y, w, y);
            }
            Stage::SlopedAcross => {
                let x = s - 50;
                canvas.scan_line(x, -1, x + 50, h);
            }
            Stage::SlopedDown => {
                let y = s - 50;
                canvas.scan_line(-1, y, w, y + 50);
            }
            Stage::HalfSegments => {
                let quarter = (w / 4).max(1);
                let x = s / h * quarter;
                let y = s % h;
                canvas.scan_line(x, y - h / 4, x + w / 2, y + h / 4);
            }
        }
        Ok(())
    }
}

impl Default for ClipTest {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for ClipTest {
    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, _: Duration) -> Result<Action> {
        let (w, h) = (extent(canvas.width_dots()), extent(canvas.height_dots()));

        // Skip stages with nothing to show (a zero-height canvas, say).
        while self.step >= self.stage.steps(w, h) {
            match self.stage.next() {
                Some(next) => {
                    self.stage = next;
                    self.step = 0;
                }
                None => return Ok(Action::Quit),
            }
        }

        self.draw(canvas, w, h)?;
        self.step += 1;

        if self.step >= self.stage.steps(w, h) && self.stage.next().is_none() {
            return Ok(Action::Quit);
        }
        Ok(Action::Continue)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
