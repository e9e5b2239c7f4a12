// SPDX-License-Identifier: MIT
//
// Frame loop — drives a scene at a fixed frame rate.
//
// Each iteration:
//
//   1. stop if SIGINT/SIGTERM arrived
//   2. forward SIGWINCH into the canvas's resize flag and apply it
//   3. let the scene draw into the current stencil
//   4. swap buffers (one write to the terminal)
//   5. sleep out whatever is left of the frame interval
//
// The loop resets the canvas on entry but never closes it: the caller owns
// the canvas and decides when the terminal is restored (drop does it too).
//
// There is no input handling. Raw mode keeps ISIG, so Ctrl-C arrives as
// SIGINT and ends the loop through the interrupt flag.

use std::thread;
use std::time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::error::Result;
use crate::signal;
use crate::terminal::Backend;

// ─── Scene ───────────────────────────────────────────────────────────────────

/// What the scene tells the loop after drawing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep going.
    Continue,
    /// Show this frame, then stop.
    Quit,
}

/// Something that draws one frame at a time.
pub trait Scene {
    /// The canvas has a new size, in dots. Called once before the first
    /// frame and after every resize.
    fn on_resize(&mut self, _width_dots: u32, _height_dots: u32) {}

    /// Draw the next frame. The canvas's current stencil is blank.
    ///
    /// `elapsed` is the time since the loop started.
    ///
    /// # Errors
    ///
    /// Any error stops the loop and is returned from
    /// [`FrameLoop::run`].
    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, elapsed: Duration) -> Result<Action>;
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Frame loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Target time per frame (microseconds). Default: 16667μs (60 Hz).
    pub frame_interval_us: u64,
    /// Stop after this many frames. Default: run until quit or interrupt.
    pub max_frames: Option<u64>,
    /// Install the SIGWINCH/SIGINT/SIGTERM handlers on entry.
    pub install_signals: bool,
}

impl LoopConfig {
    /// Interval for `fps` frames per second. Zero is treated as one.
    #[must_use]
    pub const fn with_fps(fps: u32) -> Self {
        let fps = if fps == 0 { 1 } else { fps as u64 };
        Self {
            frame_interval_us: 1_000_000 / fps,
            max_frames: None,
            install_signals: true,
        }
    }

    /// The frame interval as a `Duration`.
    #[inline]
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_micros(self.frame_interval_us)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_interval_us: 16_667, // 60 Hz
            max_frames: None,
            install_signals: true,
        }
    }
}

// ─── FrameLoop ───────────────────────────────────────────────────────────────

/// Fixed-rate driver for a [`Scene`].
///
/// ```
/// use std::time::Duration;
/// use vtdots_raster::event_loop::{Action, FrameLoop, LoopConfig, Scene};
/// use vtdots_raster::{Backend, Canvas, MemoryBackend, Result, Size};
///
/// struct Diagonal;
///
/// impl Scene for Diagonal {
///     fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, _: Duration) -> Result<Action> {
///         canvas.scan_line(0, 0, 19, 19);
///         Ok(Action::Quit)
///     }
/// }
///
/// let mut canvas = Canvas::new(MemoryBackend::new(Size::new(10, 5)))?;
/// let config = LoopConfig { install_signals: false, ..LoopConfig::default() };
/// let frames = FrameLoop::new(config).run(&mut canvas, &mut Diagonal)?;
/// assert_eq!(frames, 1);
/// # Ok::<(), vtdots_raster::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    config: LoopConfig,
}

impl FrameLoop {
    #[must_use]
    pub const fn new(config: LoopConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Reset the canvas and run `scene` until it quits, the process is
    /// interrupted, or the frame limit is reached.
    ///
    /// Returns the number of frames swapped.
    ///
    /// # Errors
    ///
    /// Returns the first error from the canvas or the scene. The canvas is
    /// left open; dropping or closing it restores the terminal.
    pub fn run<B: Backend>(&self, canvas: &mut Canvas<B>, scene: &mut impl Scene) -> Result<u64> {
        if self.config.install_signals {
            signal::install_handlers();
        }

        canvas.reset()?;
        scene.on_resize(canvas.width_dots(), canvas.height_dots());

        let interval = self.config.frame_interval();
        let start = Instant::now();
        let mut frames = 0;

        loop {
            if self.config.max_frames.is_some_and(|max| frames >= max) {
                break;
            }

            if signal::take_interrupt() {
                tracing::debug!(frames, "interrupted");
                break;
            }

            if signal::take_resize() {
                canvas.set_resize_pending();
            }
            if canvas.is_resize_pending() {
                canvas.resize()?;
                scene.on_resize(canvas.width_dots(), canvas.height_dots());
            }

            let frame_start = Instant::now();
            let action = scene.frame(canvas, start.elapsed())?;
            canvas.swap_buffers()?;
            frames += 1;

            if action == Action::Quit {
                break;
            }

            if let Some(rest) = interval.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }

        Ok(frames)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
