//! Tile pixel decoding for linearly packed sheets.
//!
//! Tiles are 8x8. The same sheet memory can be viewed at three depths:
//!
//! - **4bpp**: 32 bytes per tile, two pixels per byte
//! - **2bpp**: 16 bytes per tile, four pixels per byte
//! - **1bpp**: 8 bytes per tile, one row per byte (fonts)
//!
//! Pixel `n = y * 8 + x` lives at bit offset `n * bpp`, least significant
//! bits first, so the leftmost pixel of a 4bpp byte is its low nibble.

/// Side length of a tile in pixels.
pub const TILE_SIZE: usize = 8;

/// Tile depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFormat {
    Bpp4,
    Bpp2,
    Bpp1,
}

impl TileFormat {
    pub fn bits_per_pixel(self) -> usize {
        match self {
            TileFormat::Bpp4 => 4,
            TileFormat::Bpp2 => 2,
            TileFormat::Bpp1 => 1,
        }
    }

    /// Largest colour index a pixel of this depth can hold.
    pub fn max_value(self) -> u8 {
        ((1u16 << self.bits_per_pixel()) - 1) as u8
    }
}

/// Decodes single pixels out of raw tile bytes.
pub trait TileDecoder {
    /// Colour index at `(x, y)` within the tile; 0 when out of range or
    /// when `tile_data` is shorter than a tile.
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8;

    /// Size of a single tile in bytes.
    fn tile_size(&self) -> usize;
}

impl TileDecoder for TileFormat {
    #[inline]
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8 {
        let (x, y) = (x as usize, y as usize);
        if x >= TILE_SIZE || y >= TILE_SIZE || tile_data.len() < self.tile_size() {
            return 0;
        }

        let bpp = self.bits_per_pixel();
        let bit = (y * TILE_SIZE + x) * bpp;
        (tile_data[bit >> 3] >> (bit & 7)) & self.max_value()
    }

    fn tile_size(&self) -> usize {
        TILE_SIZE * TILE_SIZE * self.bits_per_pixel() / 8
    }
}

/// Write a pixel into raw tile bytes. Values are masked to the tile depth;
/// out-of-range coordinates are ignored.
pub fn encode_pixel(format: TileFormat, tile_data: &mut [u8], x: u8, y: u8, value: u8) {
    let (x, y) = (x as usize, y as usize);
    if x >= TILE_SIZE || y >= TILE_SIZE || tile_data.len() < format.tile_size() {
        return;
    }

    let bpp = format.bits_per_pixel();
    let bit = (y * TILE_SIZE + x) * bpp;
    let mask = format.max_value() << (bit & 7);
    let byte = &mut tile_data[bit >> 3];
    *byte = (*byte & !mask) | ((value & format.max_value()) << (bit & 7));
}
