// SPDX-License-Identifier: MIT
//
// Frame loop driven headless through a memory backend.

use std::time::Duration;

use vtdots_raster::event_loop::{Action, FrameLoop, LoopConfig, Scene};
use vtdots_raster::{Backend, Canvas, Error, MemoryBackend, Result, Size};

fn quiet(max_frames: Option<u64>) -> FrameLoop {
    FrameLoop::new(LoopConfig {
        frame_interval_us: 0,
        max_frames,
        install_signals: false,
    })
}

/// Draws a dot that walks one column per frame.
#[derive(Default)]
struct Walker {
    frames: u32,
    resizes: Vec<(u32, u32)>,
    quit_after: Option<u32>,
}

impl Scene for Walker {
    fn on_resize(&mut self, width_dots: u32, height_dots: u32) {
        self.resizes.push((width_dots, height_dots));
    }

    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, _: Duration) -> Result<Action> {
        let x = i32::try_from(self.frames).unwrap_or(i32::MAX);
        canvas.render_dot(x, 0);
        self.frames += 1;
        if self.quit_after == Some(self.frames) {
            return Ok(Action::Quit);
        }
        Ok(Action::Continue)
    }
}

#[test]
fn runs_until_frame_limit() {
    let mut canvas = Canvas::new(MemoryBackend::new(Size::new(10, 2))).unwrap();
    let mut scene = Walker::default();

    let frames = quiet(Some(4)).run(&mut canvas, &mut scene).unwrap();

    assert_eq!(frames, 4);
    assert_eq!(scene.frames, 4);
    assert_eq!(scene.resizes, vec![(20, 8)]);
    // Reset sequence plus one write per frame.
    assert_eq!(canvas.backend().writes().len(), 5);
    assert!(canvas.backend().is_raw());
}

#[test]
fn quit_shows_the_last_frame() {
    let mut canvas = Canvas::new(MemoryBackend::new(Size::new(10, 2))).unwrap();
    let mut scene = Walker {
        quit_after: Some(2),
        ..Walker::default()
    };

    let frames = quiet(None).run(&mut canvas, &mut scene).unwrap();

    assert_eq!(frames, 2);
    assert!(canvas.previous().is_lit(1, 0));
    assert!(!canvas.previous().is_lit(0, 0));
}

#[test]
fn zero_frame_limit_only_resets() {
    let mut canvas = Canvas::new(MemoryBackend::new(Size::new(4, 4))).unwrap();
    let mut scene = Walker::default();
    let frames = quiet(Some(0)).run(&mut canvas, &mut scene).unwrap();
    assert_eq!(frames, 0);
    assert_eq!(scene.frames, 0);
    assert_eq!(canvas.backend().writes().len(), 1);
}

/// Grows the terminal after the first frame.
struct Grower {
    resizes: Vec<(u32, u32)>,
    frames: u32,
}

impl Scene for Grower {
    fn on_resize(&mut self, width_dots: u32, height_dots: u32) {
        self.resizes.push((width_dots, height_dots));
    }

    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, _: Duration) -> Result<Action> {
        self.frames += 1;
        if self.frames == 1 {
            canvas.resize_flag().set();
        }
        Ok(Action::Continue)
    }
}

#[test]
fn pending_resize_is_applied_between_frames() {
    let mut backend = MemoryBackend::new(Size::new(10, 5));
    let mut canvas = Canvas::new(&mut backend).unwrap();
    canvas.backend_mut().set_size(Size::new(12, 6));

    let mut scene = Grower { resizes: Vec::new(), frames: 0 };
    quiet(Some(3)).run(&mut canvas, &mut scene).unwrap();

    assert_eq!(scene.resizes, vec![(20, 20), (24, 24)]);
    assert_eq!(canvas.size(), Size::new(12, 6));
    assert!(!canvas.is_resize_pending());
}

struct Failing;

impl Scene for Failing {
    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, _: Duration) -> Result<Action> {
        canvas.print_text(u16::MAX, 0, "nope")?;
        Ok(Action::Continue)
    }
}

#[test]
fn scene_error_stops_the_loop() {
    let mut canvas = Canvas::new(MemoryBackend::new(Size::new(4, 4))).unwrap();
    let err = quiet(None).run(&mut canvas, &mut Failing).unwrap_err();
    assert!(matches!(err, Error::TextOutOfBounds { .. }));
}

#[test]
fn write_error_stops_the_loop() {
    let mut canvas = Canvas::new(MemoryBackend::new(Size::new(4, 4))).unwrap();
    let mut scene = Walker::default();
    canvas.backend_mut().set_fail_writes(true);
    let err = quiet(None).run(&mut canvas, &mut scene).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(scene.frames, 0);
}
