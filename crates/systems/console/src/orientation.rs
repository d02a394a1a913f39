//! Flip/rotate algebra for tile blits.
//!
//! A blit's flip (2 bits) and rotation (2 bits) fold into a 3-bit
//! orientation code: bit 0 mirrors x, bit 1 mirrors y, bit 2 swaps the
//! axes. Rotation is not composed generically; each quarter turn toggles a
//! fixed set of bits:
//!
//! | rotate | xor  | or   |
//! |--------|------|------|
//! | 0      | 000  | 000  |
//! | 90     | 001  | 100  |
//! | 180    | 011  | 000  |
//! | 270    | 010  | 100  |
//!
//! For a destination offset `(px, py)` the source pixel is found by
//! mirroring first and swapping second.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    /// Only the low two bits are meaningful.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Flip::None,
            1 => Flip::Horizontal,
            2 => Flip::Vertical,
            _ => Flip::Both,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn horizontal(self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    pub fn vertical(self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }
}

/// Clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotate {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotate {
    /// Taken modulo four.
    pub fn from_quarters(quarters: i32) -> Self {
        match quarters.rem_euclid(4) {
            0 => Rotate::R0,
            1 => Rotate::R90,
            2 => Rotate::R180,
            _ => Rotate::R270,
        }
    }

    /// 90 and 270 lay a multi-cell sprite out transposed.
    pub fn is_transposing(self) -> bool {
        matches!(self, Rotate::R90 | Rotate::R270)
    }
}

/// Source addressing for one orientation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    pub mirror_x: bool,
    pub mirror_y: bool,
    pub swap: bool,
}

const fn transform(code: u8) -> Transform {
    Transform {
        mirror_x: code & 0b001 != 0,
        mirror_y: code & 0b010 != 0,
        swap: code & 0b100 != 0,
    }
}

/// Indexed by orientation code.
pub const TRANSFORMS: [Transform; 8] = [
    transform(0b000),
    transform(0b001),
    transform(0b010),
    transform(0b011),
    transform(0b100),
    transform(0b101),
    transform(0b110),
    transform(0b111),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation(u8);

impl Orientation {
    pub fn new(flip: Flip, rotate: Rotate) -> Self {
        let mut code = flip.bits();
        code ^= match rotate {
            Rotate::R0 => 0b000,
            Rotate::R90 => 0b001,
            Rotate::R180 => 0b011,
            Rotate::R270 => 0b010,
        };
        if rotate.is_transposing() {
            code |= 0b100;
        }
        Orientation(code)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn transform(self) -> Transform {
        TRANSFORMS[self.0 as usize]
    }

    /// Source pixel for destination offset `(px, py)` in a `size`-sided tile.
    #[inline]
    pub fn source(self, px: i32, py: i32, size: i32) -> (i32, i32) {
        self.transform().source(px, py, size)
    }
}

impl Transform {
    #[inline]
    pub fn source(self, px: i32, py: i32, size: i32) -> (i32, i32) {
        let x = if self.mirror_x { size - 1 - px } else { px };
        let y = if self.mirror_y { size - 1 - py } else { py };
        if self.swap {
            (y, x)
        } else {
            (x, y)
        }
    }
}
