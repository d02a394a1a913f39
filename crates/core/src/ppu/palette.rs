//! Display palette: resolves framebuffer colour indices to ARGB.
//!
//! Console palette memory stores 16 colours as consecutive RGB byte triples
//! (48 bytes). The drawing engine never reads it; only frame output does.

/// Number of colours addressable by a 4-bit index.
pub const PALETTE_SIZE: usize = 16;

/// Size in bytes of palette memory (RGB triples).
pub const PALETTE_BYTES: usize = PALETTE_SIZE * 3;

/// "Sweetie 16", the default console palette.
pub const DEFAULT_PALETTE: [u8; PALETTE_BYTES] = [
    0x1a, 0x1c, 0x2c, 0x5d, 0x27, 0x5d, 0xb1, 0x3e, 0x53, 0xef, 0x7d, 0x57, //
    0xff, 0xcd, 0x75, 0xa7, 0xf0, 0x70, 0x38, 0xb7, 0x64, 0x25, 0x71, 0x79, //
    0x29, 0x36, 0x6f, 0x3b, 0x5d, 0xc9, 0x41, 0xa6, 0xf6, 0x73, 0xef, 0xf7, //
    0xf4, 0xf4, 0xf4, 0x94, 0xb0, 0xc2, 0x56, 0x6c, 0x86, 0x33, 0x3c, 0x57, //
];

/// Maps a colour index to a 32-bit ARGB colour (0xAARRGGBB).
pub trait IndexedPalette {
    fn get_color(&self, index: usize) -> u32;

    fn set_color(&mut self, index: usize, color: u32);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A 16-colour palette decoded from palette memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbPalette {
    colors: [u32; PALETTE_SIZE],
}

impl RgbPalette {
    /// Decode palette memory; missing trailing bytes read as black.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        let mut colors = [0xFF000000; PALETTE_SIZE];
        for (color, rgb) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
            *color = 0xFF000000
                | (u32::from(rgb[0]) << 16)
                | (u32::from(rgb[1]) << 8)
                | u32::from(rgb[2]);
        }
        Self { colors }
    }

    /// Encode back to palette memory layout.
    pub fn to_rgb_bytes(&self) -> [u8; PALETTE_BYTES] {
        let mut out = [0u8; PALETTE_BYTES];
        for (rgb, &color) in out.chunks_exact_mut(3).zip(self.colors.iter()) {
            rgb[0] = (color >> 16) as u8;
            rgb[1] = (color >> 8) as u8;
            rgb[2] = color as u8;
        }
        out
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }
}

impl Default for RgbPalette {
    fn default() -> Self {
        Self::from_rgb_bytes(&DEFAULT_PALETTE)
    }
}

impl IndexedPalette for RgbPalette {
    /// Indices are masked to 4 bits, like every colour the engine handles.
    fn get_color(&self, index: usize) -> u32 {
        self.colors[index & (PALETTE_SIZE - 1)]
    }

    fn set_color(&mut self, index: usize, color: u32) {
        if index < PALETTE_SIZE {
            self.colors[index] = color | 0xFF000000;
        }
    }

    fn len(&self) -> usize {
        PALETTE_SIZE
    }
}
