// SPDX-License-Identifier: MIT
//
// Stencil buffer — what one frame looks like, cell by cell.
//
// Three parallel arrays of `rows × cols` entries: the dot mask, the
// foreground color index, and an overlay byte (0 = no overlay). A cell with
// an overlay shows that character instead of its dots.
//
// This layer trusts its caller. Dot and cell coordinates are checked once,
// at the canvas boundary, and never again here: the scan converter calls
// `render_dot` in tight loops.

use crate::dot::{Dot, DotMask};
use crate::error::{Error, Result};
use crate::geometry::{CELL_XDOTS, CELL_YDOTS, Color, Size};

/// Per-cell dot masks, colors and overlay characters for one frame.
#[derive(Clone, PartialEq, Eq)]
pub struct StencilBuffer {
    size: Size,
    masks: Vec<DotMask>,
    colors: Vec<u8>,
    overlay: Vec<u8>,
}

/// Allocate `len` zeroed entries, reporting allocation failure instead of
/// aborting.
fn zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|e| Error::oom(len.saturating_mul(size_of::<T>()), e))?;
    v.resize(len, T::default());
    Ok(v)
}

impl StencilBuffer {
    /// Allocate an empty stencil for a `size` cell grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if any array cannot be allocated.
    /// Arrays allocated before the failure are released.
    pub fn new(size: Size) -> Result<Self> {
        let len = size.area();
        Ok(Self {
            size,
            masks: zeroed(len)?,
            colors: zeroed(len)?,
            overlay: zeroed(len)?,
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Cell grid dimensions.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    #[inline]
    const fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.size.cols as usize + col as usize
    }

    /// Dot masks, row-major.
    #[inline]
    #[must_use]
    pub fn masks(&self) -> &[DotMask] {
        &self.masks
    }

    /// Color indices, row-major.
    #[inline]
    #[must_use]
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// Overlay bytes, row-major. 0 means no overlay.
    #[inline]
    #[must_use]
    pub fn overlay(&self) -> &[u8] {
        &self.overlay
    }

    /// Dot mask of one cell, or `None` outside the grid.
    #[must_use]
    pub fn mask_at(&self, row: u16, col: u16) -> Option<DotMask> {
        (row < self.size.rows && col < self.size.cols).then(|| self.masks[self.index(row, col)])
    }

    /// Color of one cell, or `None` outside the grid.
    #[must_use]
    pub fn color_at(&self, row: u16, col: u16) -> Option<Color> {
        (row < self.size.rows && col < self.size.cols)
            .then(|| Color::from_index(self.colors[self.index(row, col)]))
    }

    /// Overlay character of one cell, or `None` when there is none.
    #[must_use]
    pub fn overlay_at(&self, row: u16, col: u16) -> Option<u8> {
        if row < self.size.rows && col < self.size.cols {
            Some(self.overlay[self.index(row, col)]).filter(|&b| b != 0)
        } else {
            None
        }
    }

    /// Whether a dot is lit. Out-of-range coordinates read as unlit.
    #[must_use]
    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        let (Ok(col), Ok(row)) = (
            u16::try_from(x / u32::from(CELL_XDOTS)),
            u16::try_from(y / u32::from(CELL_YDOTS)),
        ) else {
            return false;
        };
        self.mask_at(row, col)
            .is_some_and(|m| m.contains(Dot::at(x, y).mask()))
    }

    /// Total lit dots across the buffer.
    #[must_use]
    pub fn lit_count(&self) -> u32 {
        self.masks.iter().map(|m| m.bits().count_ones()).sum()
    }

    /// Whether every array is all zeros.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.masks.iter().all(|m| m.is_empty())
            && self.colors.iter().all(|&c| c == 0)
            && self.overlay.iter().all(|&o| o == 0)
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Light the dot at `(x, y)` and set its cell's color.
    ///
    /// `x` and `y` must already be inside the dot extent. The color of the
    /// last dot written to a cell wins.
    #[inline]
    pub fn render_dot(&mut self, x: u32, y: u32, color: Color) {
        debug_assert!(x < self.size.width_dots() && y < self.size.height_dots());

        let row = (y / u32::from(CELL_YDOTS)) as usize;
        let col = (x / u32::from(CELL_XDOTS)) as usize;
        let idx = row * usize::from(self.size.cols) + col;

        self.masks[idx] |= Dot::at(x, y).mask();
        self.colors[idx] = color.index();
    }

    /// Set the overlay character of a cell. `row` and `col` must be in the grid.
    #[inline]
    pub fn print_char(&mut self, row: u16, col: u16, ch: u8) {
        debug_assert!(row < self.size.rows && col < self.size.cols);
        let idx = self.index(row, col);
        self.overlay[idx] = ch;
    }

    /// Zero all three arrays.
    pub fn clear(&mut self) {
        self.masks.fill(DotMask::empty());
        self.colors.fill(0);
        self.overlay.fill(0);
    }
}

impl std::fmt::Debug for StencilBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StencilBuffer")
            .field("size", &self.size)
            .field("lit", &self.lit_count())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
