// SPDX-License-Identifier: MIT
//
// Boids — a flock of small triangles.
//
// Every boid flies at a constant speed and only ever changes its heading,
// banking towards a desired heading at a fixed turn rate. The desired
// heading comes from one of two behaviors:
//
//   neighbors in view  → alignment + cohesion + separation, summed as unit
//                        vectors
//   alone              → wander: pick a new heading within ±30° every ~2 s
//
// The canvas wraps at its edges, so boids leaving one side re-enter on the
// other. The neighbor search is quadratic, which is fine for a few hundred
// boids.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};
use std::time::Duration;

use rand::Rng;
use vtdots_raster::event_loop::{Action, Scene};
use vtdots_raster::{Backend, Canvas, Color, Result, Vertex};

/// Boid size in dots.
const WIDTH: f32 = 6.0;
const LENGTH: f32 = 9.0;

/// Linear speed in dots per second.
const SPEED: f32 = 50.0;

/// Bank angle in degrees. Larger angles turn sharper.
const BANK_ANGLE_DEG: f32 = 80.0;

/// Wandering: mean and spread of the time between heading changes, and the
/// largest change.
const HEADING_DELAY_MS: i32 = 2000;
const HEADING_DELAY_SPREAD_MS: i32 = 500;
const HEADING_CHANGE_DEG: i32 = 30;

const VIEW_RANGE: f32 = 80.0;
const REPULSION_RANGE: f32 = 20.0;

const COLORS: [Color; 4] = [Color::Yellow, Color::Blue, Color::Green, Color::Magenta];

/// Heading change rate, in radians per second, for a coordinated turn at
/// the bank angle.
fn turn_rate() -> f32 {
    9.81 * BANK_ANGLE_DEG.to_radians().tan() / SPEED
}

// ─── Vec2 ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl Vec2 {
    const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn from_angle(rad: f32) -> Self {
        Self::new(rad.cos(), rad.sin())
    }

    fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    fn unit(self) -> Self {
        let m = self.length_squared().sqrt();
        if m == 0.0 { self } else { Self::new(self.x / m, self.y / m) }
    }

    fn normal(self) -> Self {
        Self::new(-self.y, self.x).unit()
    }

    /// Heading angle in `[0, 2π)`.
    fn angle(self) -> f32 {
        self.y.atan2(self.x).rem_euclid(TAU)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_vertex(self) -> Vertex {
        Vertex::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// ─── Boid ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Boid {
    pos: Vec2,
    /// Heading in radians.
    heading: f32,
    desired_heading: f32,
    /// Wandering: how long to keep the current desired heading, and how
    /// long it has been kept.
    heading_delay_ms: i32,
    heading_time_ms: i32,
    color: Color,
}

impl Boid {
    fn dir(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// The boid as a triangle: base across the normal, tip ahead.
    fn triangle(&self) -> [Vertex; 3] {
        let dir = self.dir();
        let n = dir.normal();
        [
            (self.pos + n * (-WIDTH / 2.0)).to_vertex(),
            (self.pos + n * (WIDTH / 2.0)).to_vertex(),
            (self.pos + dir * LENGTH).to_vertex(),
        ]
    }

    fn wander(&mut self, dt_ms: i32, rng: &mut impl Rng) {
        self.heading_time_ms += dt_ms;
        if self.heading_time_ms >= self.heading_delay_ms {
            self.heading_time_ms = 0;
            self.heading_delay_ms = HEADING_DELAY_MS
                + rng.gen_range(-HEADING_DELAY_SPREAD_MS..HEADING_DELAY_SPREAD_MS);
            #[allow(clippy::cast_precision_loss)]
            let change = rng.gen_range(-HEADING_CHANGE_DEG..HEADING_CHANGE_DEG) as f32;
            self.desired_heading = self.heading + change.to_radians();
        }
    }

    /// Turn towards the desired heading by at most `turn_rate · dt`.
    fn bank(&mut self, dt: f32, turn_rate: f32) {
        let max_turn = turn_rate * dt;
        let delta = self.desired_heading - self.heading;
        if delta.abs() <= max_turn {
            self.heading = self.desired_heading;
        } else {
            self.heading += max_turn.copysign(delta);
        }
    }
}

// ─── Flock ───────────────────────────────────────────────────────────────────

/// The boids scene.
pub struct Flock<R: Rng> {
    boids: Vec<Boid>,
    count: usize,
    bounds: Vec2,
    last: Option<Duration>,
    turn_rate: f32,
    rng: R,
}

impl<R: Rng> Flock<R> {
    /// A flock of `count` boids, placed on the first resize.
    pub fn new(count: usize, rng: R) -> Self {
        Self {
            boids: Vec::with_capacity(count),
            count,
            bounds: Vec2::default(),
            last: None,
            turn_rate: turn_rate(),
            rng,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn spawn(&mut self) {
        let (w, h) = (self.bounds.x.max(1.0), self.bounds.y.max(1.0));
        self.boids = (0..self.count)
            .map(|_| {
                let heading = (self.rng.gen_range(0..360) as f32).to_radians();
                Boid {
                    pos: Vec2::new(self.rng.gen_range(0.0..w), self.rng.gen_range(0.0..h)),
                    heading,
                    desired_heading: heading,
                    heading_delay_ms: 0,
                    heading_time_ms: 0,
                    color: COLORS[self.rng.gen_range(0..COLORS.len())],
                }
            })
            .collect();
    }

    /// Desired heading from the neighbors of boid `i`, or `None` when it
    /// has none in view.
    #[allow(clippy::cast_precision_loss)]
    fn steer(&self, i: usize) -> Option<f32> {
        let me = &self.boids[i];
        let mut neighbors = 0_usize;
        let mut alignment = Vec2::default();
        let mut cohesion = Vec2::default();
        let mut separation = Vec2::default();

        for (j, other) in self.boids.iter().enumerate() {
            if j == i {
                continue;
            }
            let offset = me.pos - other.pos;
            let dist_squared = offset.length_squared();
            if dist_squared > VIEW_RANGE * VIEW_RANGE {
                continue;
            }

            neighbors += 1;
            alignment = alignment + other.dir();
            cohesion = cohesion + other.pos;
            if dist_squared <= REPULSION_RANGE * REPULSION_RANGE {
                separation = separation + offset * (1.0 / dist_squared.max(0.001));
            }
        }

        if neighbors == 0 {
            return None;
        }

        let center = (cohesion + me.pos) * (1.0 / (neighbors + 1) as f32);
        let heading = alignment.unit() + (center - me.pos).unit() + separation.unit();
        Some(unwind_towards(heading.angle(), me.heading))
    }

    fn update(&mut self, dt: f32) {
        #[allow(clippy::cast_possible_truncation)]
        let dt_ms = (dt * 1000.0) as i32;

        for i in 0..self.boids.len() {
            match self.steer(i) {
                Some(heading) => self.boids[i].desired_heading = heading,
                None => self.boids[i].wander(dt_ms, &mut self.rng),
            }

            let (turn_rate, bounds) = (self.turn_rate, self.bounds);
            let b = &mut self.boids[i];
            b.bank(dt, turn_rate);
            b.pos = b.pos + b.dir() * (SPEED * dt);
            b.pos = Vec2::new(wrap(b.pos.x, bounds.x), wrap(b.pos.y, bounds.y));
        }
    }
}

/// `target` shifted by whole turns to lie within half a turn of `current`,
/// so banking takes the short way round.
fn unwind_towards(target: f32, current: f32) -> f32 {
    let mut t = target;
    while t - current > PI {
        t -= TAU;
    }
    while current - t > PI {
        t += TAU;
    }
    t
}

/// Wrap `v` into `[0, extent)`.
fn wrap(v: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    // rem_euclid rounds tiny negative inputs up to `extent` itself.
    let w = v.rem_euclid(extent);
    if w >= extent { 0.0 } else { w }
}

impl<R: Rng> Scene for Flock<R> {
    #[allow(clippy::cast_precision_loss)]
    fn on_resize(&mut self, width_dots: u32, height_dots: u32) {
        let first = self.boids.is_empty();
        self.bounds = Vec2::new(width_dots as f32, height_dots as f32);
        if first {
            self.spawn();
        } else {
            for b in &mut self.boids {
                b.pos = Vec2::new(wrap(b.pos.x, self.bounds.x), wrap(b.pos.y, self.bounds.y));
            }
        }
    }

    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, elapsed: Duration) -> Result<Action> {
        let dt = self.last.map_or(0.0, |last| elapsed.saturating_sub(last).as_secs_f32());
        self.last = Some(elapsed);
        self.update(dt);

        for b in &self.boids {
            canvas.trace_polygon_colored(&b.triangle(), b.color)?;
        }
        Ok(Action::Continue)
    }
}

impl<R: Rng> std::fmt::Debug for Flock<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flock")
            .field("boids", &self.boids.len())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
