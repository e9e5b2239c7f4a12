// SPDX-License-Identifier: MIT
//
// CPU meter — a scrolling bar graph of CPU utilization.
//
// Every frame samples the aggregate `cpu` line of /proc/stat and turns the
// busy and total tick deltas since the previous sample into a utilization.
// That value is smoothed with an exponential moving average (time constant
// one second) and appended to a history holding one entry per dot column.
//
//   history  → vertical bars, newest on the right, colored by load
//   current  → a filled marker at the left edge, and a text overlay
//
// A sample that cannot be read is skipped; the graph just stops moving.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::time::Duration;

use vtdots_raster::event_loop::{Action, Scene};
use vtdots_raster::{Backend, Canvas, Color, Result, Vertex};

use super::extent;

// ─── Samples ─────────────────────────────────────────────────────────────────

/// Cumulative CPU time counters, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

fn invalid(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl CpuTimes {
    /// Parse the aggregate line of /proc/stat:
    /// `cpu  user nice system idle iowait irq softirq steal ...`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the line is not the aggregate `cpu` line or
    /// a counter is missing or malformed.
    pub fn parse(line: &str) -> io::Result<Self> {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("cpu") {
            return Err(invalid("not the aggregate cpu line"));
        }

        let mut next = || -> io::Result<u64> {
            fields
                .next()
                .ok_or_else(|| invalid("cpu line is too short"))?
                .parse()
                .map_err(|_| invalid("malformed cpu counter"))
        };

        Ok(Self {
            user: next()?,
            nice: next()?,
            system: next()?,
            idle: next()?,
            iowait: next()?,
            irq: next()?,
            softirq: next()?,
            steal: next()?,
        })
    }

    const fn busy(&self) -> u64 {
        self.user.saturating_add(self.nice).saturating_add(self.system)
    }

    const fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }

    /// Busy fraction of the ticks between `earlier` and `self`. `None` if
    /// no ticks elapsed.
    #[allow(clippy::cast_precision_loss)]
    fn utilization_since(&self, earlier: &Self) -> Option<f64> {
        let busy = self.busy().saturating_sub(earlier.busy());
        let idle = self.idle_total().saturating_sub(earlier.idle_total());
        let total = busy + idle;
        (total > 0).then(|| busy as f64 / total as f64)
    }
}

/// Where the meter reads its counters from.
pub trait CpuSource {
    /// Current cumulative counters.
    ///
    /// # Errors
    ///
    /// Any I/O or parse failure.
    fn sample(&mut self) -> io::Result<CpuTimes>;
}

/// Reads `/proc/stat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStat;

impl CpuSource for ProcStat {
    fn sample(&mut self) -> io::Result<CpuTimes> {
        let stat = fs::read_to_string("/proc/stat")?;
        CpuTimes::parse(stat.lines().next().unwrap_or_default())
    }
}

// ─── CpuMeter ────────────────────────────────────────────────────────────────

const fn level_color(u: f64) -> Color {
    if u < 0.5 {
        Color::Green
    } else if u < 0.8 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// The CPU meter scene.
#[derive(Debug)]
pub struct CpuMeter<S: CpuSource> {
    source: S,
    last: Option<CpuTimes>,
    average: f64,
    history: VecDeque<f64>,
    columns: usize,
    last_frame: Option<Duration>,
}

impl<S: CpuSource> CpuMeter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last: None,
            average: 0.0,
            history: VecDeque::new(),
            columns: 0,
            last_frame: None,
        }
    }

    /// Take a sample and fold it into the average, `dt` seconds after the
    /// previous one.
    fn update(&mut self, dt: f64) {
        let now = match self.source.sample() {
            Ok(now) => now,
            Err(e) => {
                tracing::debug!(error = %e, "cpu sample skipped");
                return;
            }
        };

        if let Some(u) = self.last.and_then(|last| now.utilization_since(&last)) {
            let decay = (-dt).exp();
            self.average = self.average.mul_add(decay, u * (1.0 - decay));
            self.history.push_back(self.average);
            while self.history.len() > self.columns {
                self.history.pop_front();
            }
        }
        self.last = Some(now);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw<B: Backend>(&self, canvas: &mut Canvas<B>) -> Result<()> {
        let (w, h) = (extent(canvas.width_dots()), extent(canvas.height_dots()));
        if w == 0 || h == 0 {
            return Ok(());
        }
        let bar = |u: f64| (f64::from(h) * u.clamp(0.0, 1.0)) as i32;

        for (x, &u) in (0..w).rev().zip(self.history.iter().rev()) {
            let len = bar(u);
            if len > 0 {
                canvas.scan_line_colored(x, h - len - 1, x, h - 1, level_color(u));
            } else {
                canvas.render_dot_colored(x, h - 1, level_color(u));
            }
        }

        let y = h - 1 - bar(self.average);
        let marker = [(0, y - 2), (3, y), (0, y + 2)].map(Vertex::from);
        canvas.trace_polygon_colored(&marker, level_color(self.average))?;

        if canvas.rows() > 0 && canvas.cols() > 0 {
            canvas.print_text(0, 0, &format!("cpu {:3.0}%", self.average * 100.0))?;
        }
        Ok(())
    }
}

impl<S: CpuSource> Scene for CpuMeter<S> {
    fn on_resize(&mut self, width_dots: u32, _height_dots: u32) {
        self.columns = usize::try_from(width_dots).unwrap_or(usize::MAX);
        while self.history.len() > self.columns {
            self.history.pop_front();
        }
    }

    fn frame<B: Backend>(&mut self, canvas: &mut Canvas<B>, elapsed: Duration) -> Result<Action> {
        let dt = self.last_frame.map_or(0.0, |last| elapsed.saturating_sub(last).as_secs_f64());
        self.last_frame = Some(elapsed);
        self.update(dt);
        self.draw(canvas)?;
        Ok(Action::Continue)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
