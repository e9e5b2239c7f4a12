// SPDX-License-Identifier: MIT
//
// vtdots — demo runner for the Braille-dot rasterizer.
//
//   vtdots clip  [--fps N] [--frames N]             clipping walkthrough
//   vtdots spin  [--fps N] [--frames N]             spinning polygons
//   vtdots boids [--fps N] [--frames N] [--boids N] flocking triangles
//   vtdots cpu   [--fps N] [--frames N]             CPU utilization graph
//
// Ctrl-C (SIGINT) or SIGTERM ends any demo; `clip` also ends by itself.
//
// Setting VTDOTS_LOG=<path> writes tracing output to that file (the
// terminal itself is busy showing the frames). RUST_LOG filters it as
// usual and defaults to `debug`.

mod demos;

use std::env;
use std::fmt;
use std::fs::File;
use std::process;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use vtdots_raster::event_loop::LoopConfig;

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Demo {
    Clip,
    Spin,
    Boids,
    Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DemoOptions {
    demo: Demo,
    fps: u32,
    frames: Option<u64>,
    boids: usize,
}

impl DemoOptions {
    const fn new(demo: Demo) -> Self {
        Self { demo, fps: 60, frames: None, boids: 64 }
    }

    fn loop_config(&self) -> LoopConfig {
        LoopConfig { max_frames: self.frames, ..LoopConfig::with_fps(self.fps) }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ArgError {
    Help,
    MissingDemo,
    UnknownDemo(String),
    UnknownFlag(String),
    MissingValue(&'static str),
    BadValue(&'static str, String),
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Help => Ok(()),
            Self::MissingDemo => write!(f, "no demo given"),
            Self::UnknownDemo(d) => write!(f, "unknown demo '{d}'"),
            Self::UnknownFlag(a) => write!(f, "unknown option '{a}'"),
            Self::MissingValue(flag) => write!(f, "{flag} needs a value"),
            Self::BadValue(flag, v) => write!(f, "{flag}: invalid number '{v}'"),
        }
    }
}

const USAGE: &str = "usage: vtdots <clip|spin|boids|cpu> [--fps N] [--frames N] [--boids N]";

fn value<T: std::str::FromStr>(
    flag: &'static str,
    args: &mut impl Iterator<Item = String>,
) -> Result<T, ArgError> {
    let v = args.next().ok_or(ArgError::MissingValue(flag))?;
    v.parse().map_err(|_| ArgError::BadValue(flag, v))
}

/// Parse everything after the program name.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<DemoOptions, ArgError> {
    let mut args = args.into_iter();
    let demo = match args.next().as_deref() {
        None => return Err(ArgError::MissingDemo),
        Some("-h" | "--help") => return Err(ArgError::Help),
        Some("clip") => Demo::Clip,
        Some("spin") => Demo::Spin,
        Some("boids") => Demo::Boids,
        Some("cpu") => Demo::Cpu,
        Some(other) => return Err(ArgError::UnknownDemo(other.to_string())),
    };

    let mut opts = DemoOptions::new(demo);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(ArgError::Help),
            "--fps" => opts.fps = value("--fps", &mut args)?,
            "--frames" => opts.frames = Some(value("--frames", &mut args)?),
            "--boids" => opts.boids = value("--boids", &mut args)?,
            _ => return Err(ArgError::UnknownFlag(arg)),
        }
    }
    Ok(opts)
}

// ─── Logging ─────────────────────────────────────────────────────────────────

fn init_logging() {
    let Some(path) = env::var_os("VTDOTS_LOG") else {
        return;
    };
    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("vtdots: cannot open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ─── Run ─────────────────────────────────────────────────────────────────────

#[cfg(unix)]
fn run(opts: DemoOptions) -> vtdots_raster::Result<()> {
    use vtdots_raster::event_loop::FrameLoop;
    use vtdots_raster::{Canvas, TtyBackend};

    let mut canvas = Canvas::new(TtyBackend::stdout()?)?;
    let frame_loop = FrameLoop::new(opts.loop_config());
    tracing::info!(?opts, rows = canvas.rows(), cols = canvas.cols(), "starting");

    let result = match opts.demo {
        Demo::Clip => frame_loop.run(&mut canvas, &mut demos::ClipTest::new()),
        Demo::Spin => frame_loop.run(&mut canvas, &mut demos::Spin::new()),
        Demo::Boids => {
            let mut flock = demos::Flock::new(opts.boids, rand::thread_rng());
            frame_loop.run(&mut canvas, &mut flock)
        }
        Demo::Cpu => frame_loop.run(&mut canvas, &mut demos::CpuMeter::new(demos::ProcStat)),
    };
    canvas.close();

    let frames = result?;
    tracing::info!(frames, "done");
    Ok(())
}

#[cfg(not(unix))]
fn run(_opts: DemoOptions) -> vtdots_raster::Result<()> {
    Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "no terminal backend for this platform").into())
}

fn main() {
    let opts = match parse_args(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(ArgError::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            eprintln!("vtdots: {e}\n{USAGE}");
            process::exit(2);
        }
    };

    init_logging();

    if let Err(e) = run(opts) {
        tracing::error!(%e, "demo failed");
        eprintln!("vtdots: {e}");
        process::exit(1);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
