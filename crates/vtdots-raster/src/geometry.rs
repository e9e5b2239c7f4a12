// SPDX-License-Identifier: MIT
//
// Value types passed into the rasterizer.
//
// Vertices live in dot space (a cell is 2 dots wide and 4 tall), are signed,
// and may sit anywhere: clipping happens in the scan converter. Colors are
// the eight classic ANSI foregrounds plus "whatever the terminal uses".

use std::fmt;

/// Dots per cell horizontally.
pub const CELL_XDOTS: u16 = 2;

/// Dots per cell vertically.
pub const CELL_YDOTS: u16 = 4;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Create a size from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells (`cols × rows`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Width in dots (`cols × 2`).
    #[inline]
    #[must_use]
    pub const fn width_dots(self) -> u32 {
        self.cols as u32 * CELL_XDOTS as u32
    }

    /// Height in dots (`rows × 4`).
    #[inline]
    #[must_use]
    pub const fn height_dots(self) -> u32 {
        self.rows as u32 * CELL_YDOTS as u32
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

// ─── Vertex ─────────────────────────────────────────────────────────────────

/// A point in dot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Vertex {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// 2D cross product of edges `a→b` and `b→c`.
///
/// Positive for one turning direction, negative for the other, zero when
/// the three points are collinear. Computed in `i64` so canvas-sized and
/// wildly off-canvas coordinates alike cannot overflow.
#[inline]
#[must_use]
pub fn turn(a: Vertex, b: Vertex, c: Vertex) -> i64 {
    let (abx, aby) = (i64::from(b.x) - i64::from(a.x), i64::from(b.y) - i64::from(a.y));
    let (bcx, bcy) = (i64::from(c.x) - i64::from(b.x), i64::from(c.y) - i64::from(b.y));
    abx * bcy - aby * bcx
}

// ─── Color ──────────────────────────────────────────────────────────────────

/// Foreground palette.
///
/// `Default` leaves the terminal's own foreground in place (SGR 39). The
/// others are the eight standard colors (SGR 30–37).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    Default = 0,
    Black = 1,
    Red = 2,
    Green = 3,
    Yellow = 4,
    Blue = 5,
    Magenta = 6,
    Cyan = 7,
    White = 8,
}

impl Color {
    /// Every color, in index order.
    pub const ALL: [Self; 9] = [
        Self::Default,
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// The eight palette colors, without `Default`.
    pub const PALETTE: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// Index stored in a stencil color slot.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`index`](Self::index). Out-of-range indices map to `Default`.
    #[inline]
    #[must_use]
    pub const fn from_index(idx: u8) -> Self {
        match idx {
            1 => Self::Black,
            2 => Self::Red,
            3 => Self::Green,
            4 => Self::Yellow,
            5 => Self::Blue,
            6 => Self::Magenta,
            7 => Self::Cyan,
            8 => Self::White,
            _ => Self::Default,
        }
    }

    /// The digit after `3` in the SGR foreground code (`ESC[3Nm`).
    #[inline]
    #[must_use]
    pub const fn sgr_digit(self) -> u8 {
        match self {
            Self::Default => b'9',
            other => b'0' + other as u8 - 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
