// SPDX-License-Identifier: MIT
//
// Dot layout inside a cell, and the Braille encoding of a cell's mask.
//
// Each cell holds a 2×4 grid of dots. The stencil numbers them column by
// column, top to bottom:
//
//   +---+---+
//   | 0 | 4 |
//   +---+---+
//   | 1 | 5 |
//   +---+---+
//   | 2 | 6 |
//   +---+---+
//   | 3 | 7 |
//   +---+---+
//
// so the bit for dot (x, y) is `(y % 4) + 4 * (x % 2)`. Unicode Braille
// (U+2800–U+28FF) numbers them differently: the top three rows go column by
// column, and the bottom row was added later as dots 7 and 8:
//
//   +---+---+
//   | 0 | 3 |
//   +---+---+
//   | 1 | 4 |
//   +---+---+
//   | 2 | 5 |
//   +---+---+
//   | 6 | 7 |
//   +---+---+
//
// The permutation between the two is a 256-entry table built at compile time.

// ─── Dot ─────────────────────────────────────────────────────────────────────

/// One of the eight dot positions of a cell, named by column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Dot {
    Left0 = 0,
    Left1 = 1,
    Left2 = 2,
    Left3 = 3,
    Right0 = 4,
    Right1 = 5,
    Right2 = 6,
    Right3 = 7,
}

impl Dot {
    /// All positions in stencil bit order.
    pub const ALL: [Self; 8] = [
        Self::Left0,
        Self::Left1,
        Self::Left2,
        Self::Left3,
        Self::Right0,
        Self::Right1,
        Self::Right2,
        Self::Right3,
    ];

    /// The position a dot-space coordinate falls on within its cell.
    #[inline]
    #[must_use]
    pub const fn at(x: u32, y: u32) -> Self {
        Self::ALL[(y % 4 + 4 * (x % 2)) as usize]
    }

    /// Column within the cell, 0 (left) or 1 (right).
    #[inline]
    #[must_use]
    pub const fn column(self) -> u8 {
        self as u8 / 4
    }

    /// Row within the cell, 0 (top) to 3 (bottom).
    #[inline]
    #[must_use]
    pub const fn row(self) -> u8 {
        self as u8 % 4
    }

    /// Bit index in the stencil mask.
    #[inline]
    #[must_use]
    pub const fn stencil_bit(self) -> u8 {
        self as u8
    }

    /// Bit index in the Braille codepoint offset.
    #[must_use]
    pub const fn braille_bit(self) -> u8 {
        match self.row() {
            3 => 6 + self.column(),
            row => row + 3 * self.column(),
        }
    }

    /// This position as a single-dot mask.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> DotMask {
        DotMask::from_bits_retain(1 << self.stencil_bit())
    }
}

// ─── DotMask ─────────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Which of a cell's eight dots are lit, in stencil bit order.
    ///
    /// ```
    /// use vtdots_raster::dot::{Dot, DotMask};
    ///
    /// let m = Dot::Left0.mask() | Dot::Right3.mask();
    /// assert!(m.contains(DotMask::LEFT_0));
    /// assert_eq!(m.bits(), 0b1000_0001);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct DotMask: u8 {
        const LEFT_0  = 1 << 0;
        const LEFT_1  = 1 << 1;
        const LEFT_2  = 1 << 2;
        const LEFT_3  = 1 << 3;
        const RIGHT_0 = 1 << 4;
        const RIGHT_1 = 1 << 5;
        const RIGHT_2 = 1 << 6;
        const RIGHT_3 = 1 << 7;
    }
}

impl DotMask {
    /// The mask re-ordered into Braille bit order.
    #[inline]
    #[must_use]
    pub const fn to_braille(self) -> u8 {
        BRAILLE_PERMUTATION[self.bits() as usize]
    }

    /// The UTF-8 bytes of the Braille glyph showing this mask.
    #[inline]
    #[must_use]
    pub const fn glyph(self) -> [u8; 3] {
        braille_glyph(self.to_braille())
    }
}

// ─── Braille Encoding ────────────────────────────────────────────────────────

/// First codepoint of the Braille Patterns block (the empty pattern).
pub const BRAILLE_BASE: u32 = 0x2800;

/// Stencil mask → Braille offset, for every possible mask.
pub static BRAILLE_PERMUTATION: [u8; 256] = build_permutation();

const fn build_permutation() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut mask = 0;
    while mask < 256 {
        let mut out = 0u8;
        let mut i = 0;
        while i < 8 {
            if mask & (1 << i) != 0 {
                out |= 1 << Dot::ALL[i].braille_bit();
            }
            i += 1;
        }
        table[mask] = out;
        mask += 1;
    }
    table
}

/// UTF-8 encoding of `U+2800 + offset`.
///
/// Every codepoint in the block encodes to `E2 A0..A3 80..BF`, so the
/// offset splits into its top two bits and its low six.
#[inline]
#[must_use]
pub const fn braille_glyph(offset: u8) -> [u8; 3] {
    [0xE2, 0xA0 | (offset >> 6), 0x80 | (offset & 0x3F)]
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph_char(bytes: [u8; 3]) -> char {
        std::str::from_utf8(&bytes).unwrap().chars().next().unwrap()
    }

    // ── Dot positions ─────────────────────────────────────────────────

    #[test]
    fn dot_at_maps_coordinates() {
        assert_eq!(Dot::at(0, 0), Dot::Left0);
        assert_eq!(Dot::at(0, 3), Dot::Left3);
        assert_eq!(Dot::at(1, 0), Dot::Right0);
        assert_eq!(Dot::at(1, 3), Dot::Right3);
        // Wraps per cell.
        assert_eq!(Dot::at(7, 6), Dot::Right2);
    }

    #[test]
    fn dot_stencil_bit_formula() {
        for x in 0..4 {
            for y in 0..8 {
                let expected = (y % 4) + 4 * (x % 2);
                assert_eq!(u32::from(Dot::at(x, y).stencil_bit()), expected);
            }
        }
    }

    #[test]
    fn dot_row_and_column() {
        assert_eq!((Dot::Left2.column(), Dot::Left2.row()), (0, 2));
        assert_eq!((Dot::Right1.column(), Dot::Right1.row()), (1, 1));
    }

    #[test]
    fn braille_bits_follow_unicode_numbering() {
        assert_eq!(Dot::Left0.braille_bit(), 0);
        assert_eq!(Dot::Left1.braille_bit(), 1);
        assert_eq!(Dot::Left2.braille_bit(), 2);
        assert_eq!(Dot::Right0.braille_bit(), 3);
        assert_eq!(Dot::Right1.braille_bit(), 4);
        assert_eq!(Dot::Right2.braille_bit(), 5);
        assert_eq!(Dot::Left3.braille_bit(), 6);
        assert_eq!(Dot::Right3.braille_bit(), 7);
    }

    #[test]
    fn braille_bits_are_a_permutation() {
        let mut seen = 0u8;
        for d in Dot::ALL {
            seen |= 1 << d.braille_bit();
        }
        assert_eq!(seen, 0xFF);
    }

    // ── Permutation table ─────────────────────────────────────────────

    #[test]
    fn permutation_of_empty_and_full() {
        assert_eq!(DotMask::empty().to_braille(), 0);
        assert_eq!(DotMask::all().to_braille(), 0xFF);
    }

    #[test]
    fn permutation_matches_shift_formula() {
        // Left column top three stay, left bottom moves up to bit 6,
        // right top three move down one, right bottom stays.
        for m in 0..=255u8 {
            let expected = (m & 0x07) | ((m & 0x08) << 3) | ((m & 0x70) >> 1) | (m & 0x80);
            assert_eq!(BRAILLE_PERMUTATION[usize::from(m)], expected, "mask {m:#010b}");
        }
    }

    #[test]
    fn permutation_preserves_popcount() {
        for m in 0..=255u8 {
            assert_eq!(BRAILLE_PERMUTATION[usize::from(m)].count_ones(), m.count_ones());
        }
    }

    // ── Glyph bytes ───────────────────────────────────────────────────

    #[test]
    fn glyph_of_empty_mask_is_blank_pattern() {
        assert_eq!(glyph_char(DotMask::empty().glyph()), '\u{2800}');
    }

    #[test]
    fn glyph_of_full_mask() {
        assert_eq!(glyph_char(DotMask::all().glyph()), '\u{28FF}');
    }

    #[test]
    fn glyph_single_dots() {
        assert_eq!(glyph_char(Dot::Left0.mask().glyph()), '⠁');
        assert_eq!(glyph_char(Dot::Right0.mask().glyph()), '⠈');
        assert_eq!(glyph_char(Dot::Left3.mask().glyph()), '⡀');
        assert_eq!(glyph_char(Dot::Right3.mask().glyph()), '⢀');
    }

    #[test]
    fn glyph_matches_char_encoding_for_every_offset() {
        for offset in 0..=255u8 {
            let ch = char::from_u32(BRAILLE_BASE + u32::from(offset)).unwrap();
            let mut enc = [0u8; 4];
            assert_eq!(ch.encode_utf8(&mut enc).as_bytes(), &braille_glyph(offset));
        }
    }
}
