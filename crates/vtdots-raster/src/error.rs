// SPDX-License-Identifier: MIT
//
// Error taxonomy for the rasterizer.
//
// Four kinds of failure, none of them retried internally:
//
//   OutOfMemory          — a buffer could not be allocated or grown
//   InconsistentWinding  — a polygon whose turn direction flips
//   TextOutOfBounds      — overlay text placed outside the cell grid
//   Io                   — the terminal rejected a query, mode change or write
//
// Points and lines outside the canvas are not errors: they are clipped.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors reported by canvas operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Allocation of a stencil array or the output buffer failed.
    #[error("out of memory while allocating {bytes} bytes")]
    OutOfMemory {
        /// Size of the allocation that failed.
        bytes: usize,
        /// The allocator's report. `None` when a configured size limit
        /// refused the growth before asking the allocator.
        #[source]
        source: Option<TryReserveError>,
    },

    /// The polygon's vertices do not keep a single turning direction.
    #[error("polygon winding direction reverses at vertex {vertex}")]
    InconsistentWinding {
        /// Index of the vertex where the turn direction flipped.
        vertex: usize,
    },

    /// Text was placed at a cell outside the grid.
    #[error("text position ({row}, {col}) is outside the {rows}x{cols} cell grid")]
    TextOutOfBounds {
        row: u16,
        col: u16,
        rows: u16,
        cols: u16,
    },

    /// Terminal I/O failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Map a failed `try_reserve` of `bytes` to [`Error::OutOfMemory`].
    pub(crate) fn oom(bytes: usize, cause: TryReserveError) -> Self {
        Self::OutOfMemory { bytes, source: Some(cause) }
    }

    /// [`Error::OutOfMemory`] for growth refused by a size limit.
    pub(crate) const fn over_limit(bytes: usize) -> Self {
        Self::OutOfMemory { bytes, source: None }
    }

    /// Whether this error came from bad caller input rather than the
    /// environment.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InconsistentWinding { .. } | Self::TextOutOfBounds { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────
