// SPDX-License-Identifier: MIT
//
// Scan converter — points, clipped lines and filled convex polygons.
//
// Everything here ends in `StencilBuffer::render_dot`, which trusts its
// coordinates. So this is the one place where dot coordinates are checked:
// points are tested against the extent, lines are clipped to it before they
// are walked, and polygon spans are drawn as clipped lines.
//
// Line walking is exact. The driving axis steps one dot at a time and the
// other coordinate is solved from the line equation as a rational number,
// rounded to nearest with ties going up. An exact tie (the line passes
// precisely between two dots) lights both dots, which keeps shallow lines
// from looking thin next to 45° ones.
//
// Polygon filling walks scanlines over the polygon's vertical extent. Per
// scanline, every edge is classified in priority order:
//
//   1. horizontal at this y       → drawn directly as a line
//   2. endpoint at the global top
//      or bottom of the polygon   → that vertex is drawn as a dot
//   3. crossing this y            → contributes an x-intercept
//
// and the intercepts are joined with a horizontal span.

use crate::error::{Error, Result};
use crate::geometry::{Color, Vertex, turn};
use crate::stencil::StencilBuffer;

// ─── Points ──────────────────────────────────────────────────────────────────

/// Render a dot if `(x, y)` lies on the buffer. Anything else is dropped.
pub fn point(sb: &mut StencilBuffer, x: i64, y: i64, color: Color) {
    let size = sb.size();
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        if x < size.width_dots() && y < size.height_dots() {
            sb.render_dot(x, y, color);
        }
    }
}

// ─── Lines ───────────────────────────────────────────────────────────────────

/// Clip the segment `(x0, y0) → (x1, y1)` against the canvas grown by half a
/// dot on every side, `[-½, width - ½] × [-½, height - ½]`.
///
/// Parametric (Liang–Barsky) clipping: the segment is `p(t) = p0 + t·d` for
/// `t ∈ [0, 1]`, and each boundary half-plane either rejects it outright
/// (parallel and outside), raises the entry parameter, or lowers the exit
/// parameter. An empty `[entry, exit]` interval means no part is visible.
///
/// The half-dot margin keeps every point that rounds onto the canvas,
/// including exact ties on the outer edge.
///
/// Returns the visible parameter interval `(entry, exit)`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::similar_names)]
pub fn clip_line(
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
    width: u32,
    height: u32,
) -> Option<(f64, f64)> {
    if width == 0 || height == 0 {
        return None;
    }

    let (x0, y0) = (x0 as f64, y0 as f64);
    let dx = x1 as f64 - x0;
    let dy = y1 as f64 - y0;
    let xmax = f64::from(width) - 0.5;
    let ymax = f64::from(height) - 0.5;

    // Edge tests p·t <= q for left, right, top, bottom.
    let p = [-dx, dx, -dy, dy];
    let q = [x0 + 0.5, xmax - x0, y0 + 0.5, ymax - y0];

    let mut entry = 0.0_f64;
    let mut exit = 1.0_f64;

    for (&pi, &qi) in p.iter().zip(&q) {
        if pi == 0.0 {
            if qi < 0.0 {
                return None;
            }
        } else {
            let t = qi / pi;
            if pi < 0.0 {
                entry = entry.max(t);
            } else {
                exit = exit.min(t);
            }
        }
    }

    (entry <= exit).then_some((entry, exit))
}

/// Clip and render a line segment, endpoints inclusive.
///
/// Every dot is solved from the full segment, so the part that stays on
/// the canvas is exactly what a larger canvas would show.
#[allow(clippy::similar_names)]
pub fn line(sb: &mut StencilBuffer, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Color) {
    if (x0, y0) == (x1, y1) {
        point(sb, x0, y0, color);
        return;
    }

    let size = sb.size();
    let Some((entry, exit)) = clip_line((x0, y0), (x1, y1), size.width_dots(), size.height_dots())
    else {
        return;
    };

    let dx = x1 - x0;
    let dy = y1 - y0;

    if dx.abs() >= dy.abs() {
        // x drives (horizontal, diagonal, shallow): y = y1 + dy·(x − x1)/dx.
        for x in driving_range(x0, x1, entry, exit, size.width_dots()) {
            let (y, tie) = solve(y1, i128::from(dy) * i128::from(x - x1), i128::from(dx));
            point(sb, x, y, color);
            if tie {
                point(sb, x, y - 1, color);
            }
        }
    } else {
        // y drives (vertical, steep): x = x1 + dx·(y − y1)/dy.
        for y in driving_range(y0, y1, entry, exit, size.height_dots()) {
            let (x, tie) = solve(x1, i128::from(dx) * i128::from(y - y1), i128::from(dy));
            point(sb, x, y, color);
            if tie {
                point(sb, x - 1, y, color);
            }
        }
    }
}

/// Steps of the driving axis to walk: the clipped interval widened by one
/// step for float noise, kept within the segment and the canvas. Steps
/// that still fall off the canvas in the other axis are dropped by `point`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn driving_range(
    from: i64,
    to: i64,
    entry: f64,
    exit: f64,
    extent: u32,
) -> std::ops::RangeInclusive<i64> {
    let delta = (to - from) as f64;
    let a = from as f64 + entry * delta;
    let b = from as f64 + exit * delta;

    let lo = (a.min(b).floor() as i64 - 1).max(from.min(to)).max(0);
    let hi = (a.max(b).ceil() as i64 + 1).min(from.max(to)).min(i64::from(extent) - 1);
    lo..=hi
}

/// Round `base + num/den` to nearest, ties toward +∞.
///
/// Returns the rounded value and whether the fraction was exactly one half,
/// in which case `value - 1` is equally close. The products of two i32
/// coordinate spans need more than 64 bits, hence `i128`.
#[allow(clippy::cast_possible_truncation)]
fn solve(base: i64, num: i128, den: i128) -> (i64, bool) {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let rounded = (2 * num + den).div_euclid(2 * den);
    let tie = (2 * num).rem_euclid(2 * den) == den;
    // The solved point lies on the segment, so it is within i64 range.
    (base + rounded as i64, tie)
}

// ─── Polygons ────────────────────────────────────────────────────────────────

/// Check that consecutive edges of a closed vertex loop all turn the same way.
///
/// Collinear triples (zero cross product) are ignored. Polygons with fewer
/// than three vertices trivially pass.
///
/// # Errors
///
/// Returns [`Error::InconsistentWinding`] naming the vertex where the turn
/// direction flips.
pub fn check_winding(vertices: &[Vertex]) -> Result<()> {
    let n = vertices.len();
    if n < 3 {
        return Ok(());
    }

    let mut direction = 0_i64;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];

        let cross = turn(a, b, c);
        if cross == 0 {
            continue;
        }
        if direction.signum() * cross.signum() < 0 {
            return Err(Error::InconsistentWinding { vertex: (i + 1) % n });
        }
        direction = cross;
    }

    Ok(())
}

/// Trace and fill a convex polygon.
///
/// Zero vertices draw nothing, one draws a dot, two draw a line.
///
/// # Errors
///
/// Returns [`Error::InconsistentWinding`] before touching the buffer if the
/// vertices change turning direction.
pub fn polygon(sb: &mut StencilBuffer, vertices: &[Vertex], color: Color) -> Result<()> {
    let pos = |v: Vertex| (i64::from(v.x), i64::from(v.y));

    match vertices {
        [] => return Ok(()),
        [v] => {
            point(sb, i64::from(v.x), i64::from(v.y), color);
            return Ok(());
        }
        [a, b] => {
            line(sb, pos(*a), pos(*b), color);
            return Ok(());
        }
        _ => {}
    }

    check_winding(vertices)?;

    let height = i64::from(sb.size().height_dots());
    let (ymin, ymax) = vertices.iter().fold((i64::MAX, i64::MIN), |(lo, hi), v| {
        (lo.min(i64::from(v.y)), hi.max(i64::from(v.y)))
    });

    if ymax < 0 || ymin >= height {
        return Ok(());
    }

    let n = vertices.len();
    for y in ymin.max(0)..=ymax.min(height - 1) {
        let mut span: Option<(i64, i64)> = None;

        for i in 0..n {
            let (ax, ay) = pos(vertices[i]);
            let (bx, by) = pos(vertices[(i + 1) % n]);

            if ay == y && by == y {
                line(sb, (ax, ay), (bx, by), color);
            } else if (ay == y || by == y) && (y == ymin || y == ymax) {
                let x = if ay == y { ax } else { bx };
                point(sb, x, y, color);
            } else if (ay <= y && y <= by) || (by <= y && y <= ay) {
                let x = intercept((ax, ay), (bx, by), y);
                span = Some(span.map_or((x, x), |(lo, hi)| (lo.min(x), hi.max(x))));
            }
        }

        match span {
            Some((lo, hi)) if lo != hi => line(sb, (lo, y), (hi, y), color),
            Some((x, _)) => point(sb, x, y, color),
            None => {}
        }
    }

    Ok(())
}

/// X where edge `a–b` crosses scanline `y`, truncated toward zero.
///
/// The edge must not be horizontal.
#[allow(clippy::cast_possible_truncation)]
fn intercept((ax, ay): (i64, i64), (bx, by): (i64, i64), y: i64) -> i64 {
    // x = bx + (ax − bx)(y − by)/(ay − by), as one fraction so the
    // truncation applies to the exact value.
    let den = i128::from(ay - by);
    let num = i128::from(ax - bx) * i128::from(y - by) + i128::from(bx) * den;
    // |x| stays within the edge's x range, so it fits back into i64.
    (num / den) as i64
}

// ─── Tests ───────────────────────────────────────────────────────────────────
