//! Tilesheet addressing: which bytes a tile index refers to.
//!
//! A blit segment is a 4-bit selector that picks a memory region, a tile
//! depth and a 256-tile page within it:
//!
//! | segment | region   | depth | page |
//! |---------|----------|-------|------|
//! | 0-1     | font     | 1bpp  | 0    |
//! | 2-3     | graphics | 4bpp  | 0-1  |
//! | 4-7     | graphics | 2bpp  | 0-3  |
//! | 8-15    | graphics | 1bpp  | 0-7  |
//!
//! At 4bpp the graphics region holds the background page followed by the
//! sprite page; lower depths reinterpret the same bytes as more, smaller
//! tiles.

use fc_core::ppu::tile::{TileDecoder, TileFormat, TILE_SIZE};
use serde::{Deserialize, Serialize};

/// Tiles addressed by one segment before `local` lookups wrap.
pub const TILES_PER_PAGE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlitSegment(u8);

impl BlitSegment {
    pub const FONT: BlitSegment = BlitSegment(1);
    pub const TILES: BlitSegment = BlitSegment(2);
    pub const SPRITES: BlitSegment = BlitSegment(3);

    /// Only the low four bits are meaningful.
    pub fn new(value: u8) -> Self {
        BlitSegment(value & 0x0F)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_font(self) -> bool {
        self.0 < 2
    }

    pub fn format(self) -> TileFormat {
        match self.0 {
            2 | 3 => TileFormat::Bpp4,
            4..=7 => TileFormat::Bpp2,
            _ => TileFormat::Bpp1,
        }
    }

    pub fn page(self) -> usize {
        match self.0 {
            0 | 1 => 0,
            2 | 3 => (self.0 - 2) as usize,
            4..=7 => (self.0 - 4) as usize,
            _ => (self.0 - 8) as usize,
        }
    }

    /// The segment `font()` reads from: the same depth with the top page
    /// bit flipped (2<->3, 4<->6, 8<->12), so text drawn while sprites are
    /// blitted from the background page comes from the sprite page.
    pub fn font_target(self) -> BlitSegment {
        let mut rest = self.0 >> 1;
        let mut mask = 1u8;
        loop {
            rest >>= 1;
            if rest == 0 {
                break;
            }
            mask <<= 1;
        }
        BlitSegment(self.0 ^ mask)
    }
}

impl Default for BlitSegment {
    fn default() -> Self {
        BlitSegment::TILES
    }
}

/// A borrowed view of one tile's bytes.
#[derive(Debug, Clone, Copy)]
pub struct TilePtr<'a> {
    data: &'a [u8],
    format: TileFormat,
}

impl<'a> TilePtr<'a> {
    /// Colour index at `(x, y)`; callers pass tile-local coordinates 0..8.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        self.format.decode_pixel(self.data, x as u8, y as u8)
    }

    pub fn format(&self) -> TileFormat {
        self.format
    }
}

/// A memory region viewed through a blit segment.
#[derive(Debug, Clone, Copy)]
pub struct TileSheet<'a> {
    data: &'a [u8],
    format: TileFormat,
    page: usize,
}

impl<'a> TileSheet<'a> {
    pub fn new(data: &'a [u8], segment: BlitSegment) -> Self {
        Self {
            data,
            format: segment.format(),
            page: segment.page(),
        }
    }

    pub fn format(&self) -> TileFormat {
        self.format
    }

    /// Tiles per sheet row; the sheet is always 128 bytes wide.
    pub fn cols(&self) -> usize {
        16 * 4 / self.format.bits_per_pixel()
    }

    pub fn tile_count(&self) -> usize {
        self.data.len() / self.format.tile_size()
    }

    /// Resolve a tile index relative to this segment's page.
    ///
    /// With `local` the index wraps within the page; otherwise it may run
    /// past the page and wraps within the whole region.
    pub fn tile(&self, index: i32, local: bool) -> TilePtr<'a> {
        let count = self.tile_count();
        if count == 0 {
            return TilePtr {
                data: &[],
                format: self.format,
            };
        }

        let base = (self.page * TILES_PER_PAGE) as i64;
        let index = if local {
            base + i64::from(index & (TILES_PER_PAGE as i32 - 1))
        } else {
            base + i64::from(index)
        };
        let index = index.rem_euclid(count as i64) as usize;

        let size = self.format.tile_size();
        TilePtr {
            data: &self.data[index * size..(index + 1) * size],
            format: self.format,
        }
    }

    /// Sheet-space pixel; coordinates wrap within the sheet.
    pub fn pixel(&self, u: i32, v: i32) -> u8 {
        let cols = self.cols();
        let rows = self.tile_count() / cols;
        if rows == 0 {
            return 0;
        }

        let size = TILE_SIZE as i32;
        let u = u.rem_euclid(cols as i32 * size);
        let v = v.rem_euclid(rows as i32 * size);
        let index = (v / size) * cols as i32 + u / size;
        self.tile(index, false).pixel(u % size, v % size)
    }
}
