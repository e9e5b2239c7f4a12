// SPDX-License-Identifier: MIT
//
// Demo scenes. Each one is a `Scene` driven by the library's frame loop and
// touches the canvas only through its public drawing calls.
//
//   clip   → primitives sweeping across every edge of the canvas
//   spin   → rotating filled polygons with a text overlay
//   boids  → a wandering, flocking swarm of colored triangles
//   cpu    → scrolling CPU utilization bars with a text readout

pub mod boids;
pub mod clip;
pub mod cpu;
pub mod spin;

pub use boids::Flock;
pub use clip::ClipTest;
pub use cpu::{CpuMeter, ProcStat};
pub use spin::Spin;

/// Clamp a dot-space extent to `i32` for vertex arithmetic.
pub fn extent(dots: u32) -> i32 {
    i32::try_from(dots).unwrap_or(i32::MAX)
}
