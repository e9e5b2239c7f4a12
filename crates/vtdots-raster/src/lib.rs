// SPDX-License-Identifier: MIT
//
// vtdots-raster — vector rasterizer for ANSI terminals.
//
// Every terminal cell becomes a 2×4 grid of dots drawn with a Braille
// glyph. Points, clipped lines and filled convex polygons are scan
// converted into a per-cell stencil; at the end of each frame the stencil
// is diffed against the last flushed one and only the changed cells are
// re-emitted, as one contiguous write.
//
// The core (stencil, scan converter, diff encoder) never talks to the OS.
// Terminal access goes through the `Backend` trait: a raw POSIX tty for
// real use, an in-memory recorder for tests and headless rendering.

pub mod ansi;
pub mod canvas;
pub mod diff;
pub mod dot;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod output;
pub mod raster;
pub mod signal;
pub mod stencil;
pub mod terminal;

pub use canvas::{Canvas, ResizeFlag};
pub use diff::DiffStats;
pub use error::{Error, Result};
pub use geometry::{Color, Size, Vertex};
pub use terminal::{Backend, MemoryBackend};

#[cfg(unix)]
pub use terminal::TtyBackend;
