//! Console RAM: the framebuffer and every region the drawing calls read.
//!
//! External collaborators (cartridge loader, editors, script bindings)
//! populate these regions; the engine only reads them, except for the
//! screen which it writes through [`Screen::poke4`].

use crate::tilesheet::{BlitSegment, TileSheet};
use crate::{FLAGS, FONT_CHARS, HEIGHT, MAP_HEIGHT, MAP_WIDTH, WIDTH};
use fc_core::logging::{log, LogCategory, LogLevel};
use fc_core::ppu::palette::{RgbPalette, DEFAULT_PALETTE, PALETTE_BYTES};
use fc_core::ppu::tile::{encode_pixel, TileDecoder, TileFormat};

/// Bytes in the packed 4bpp screen.
pub const SCREEN_BYTES: usize = (WIDTH * HEIGHT / 2) as usize;

/// Bytes in the graphics region: background and sprite pages at 4bpp.
pub const TILES_BYTES: usize = 2 * 256 * 32;

/// Bytes of glyph data: regular and alternate sets, 8 bytes per glyph.
pub const FONT_BYTES: usize = 2 * FONT_CHARS * 8;

pub const MAP_BYTES: usize = (MAP_WIDTH * MAP_HEIGHT) as usize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("{region}: {actual} bytes do not fit in {capacity}")]
    SizeMismatch {
        region: &'static str,
        capacity: usize,
        actual: usize,
    },
}

/// Copy `src` into the start of `dst` and zero the remainder.
///
/// Cartridge data drops trailing zeros, so short input is normal.
fn load_region(region: &'static str, dst: &mut [u8], src: &[u8]) -> Result<(), MemoryError> {
    if src.len() > dst.len() {
        return Err(MemoryError::SizeMismatch {
            region,
            capacity: dst.len(),
            actual: src.len(),
        });
    }
    dst[..src.len()].copy_from_slice(src);
    dst[src.len()..].fill(0);
    log(LogCategory::Memory, LogLevel::Debug, || {
        format!("loaded {} bytes into {}", src.len(), region)
    });
    Ok(())
}

/// The 240x136 framebuffer, two 4-bit pixels per byte (even pixel in the
/// low nibble).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    data: Box<[u8]>,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            data: vec![0; SCREEN_BYTES].into_boxed_slice(),
        }
    }

    /// Pixel at linear index `y * WIDTH + x`.
    #[inline]
    pub fn peek4(&self, index: usize) -> u8 {
        let byte = self.data[index >> 1];
        if index & 1 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    /// The only path that writes individual framebuffer pixels.
    #[inline]
    pub(crate) fn poke4(&mut self, index: usize, color: u8) {
        let byte = &mut self.data[index >> 1];
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | (color & 0x0F);
        } else {
            *byte = (*byte & 0x0F) | ((color & 0x0F) << 4);
        }
    }

    /// Pixel at `(x, y)`, or 0 outside the screen.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= WIDTH || y >= HEIGHT {
            return 0;
        }
        self.peek4((y * WIDTH + x) as usize)
    }

    /// Whole-screen fill, ignoring the clip rectangle.
    pub(crate) fn fill(&mut self, color: u8) {
        let color = color & 0x0F;
        self.data.fill(color | (color << 4));
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), MemoryError> {
        load_region("screen", &mut self.data, bytes)
    }

    /// Row-major colour indices.
    pub fn pixels(&self) -> impl Iterator<Item = u8> + '_ {
        self.data.iter().flat_map(|&b| [b & 0x0F, b >> 4])
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// Nominal -> physical colour remap table, one nibble per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMap([u8; 8]);

impl ColorMap {
    pub fn identity() -> Self {
        let mut map = ColorMap([0; 8]);
        map.reset();
        map
    }

    /// Physical colour for a nominal one; the index is masked to 4 bits.
    #[inline]
    pub fn get(&self, color: u8) -> u8 {
        let color = color & 0x0F;
        let byte = self.0[(color >> 1) as usize];
        if color & 1 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    pub fn set(&mut self, color: u8, value: u8) {
        let color = color & 0x0F;
        let value = value & 0x0F;
        let byte = &mut self.0[(color >> 1) as usize];
        if color & 1 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    pub fn reset(&mut self) {
        for i in 0..16 {
            self.set(i, i);
        }
    }

    pub fn bytes(&self) -> [u8; 8] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        ColorMap(bytes)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::identity()
    }
}

/// Video state scoped to one vbank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vram {
    pub screen: Screen,
    pub palette: [u8; PALETTE_BYTES],
    pub mapping: ColorMap,
    pub segment: BlitSegment,
}

impl Vram {
    pub fn new() -> Self {
        Self {
            screen: Screen::new(),
            palette: DEFAULT_PALETTE,
            mapping: ColorMap::identity(),
            segment: BlitSegment::default(),
        }
    }

    pub fn display_palette(&self) -> RgbPalette {
        RgbPalette::from_rgb_bytes(&self.palette)
    }

    pub fn load_palette(&mut self, bytes: &[u8]) -> Result<(), MemoryError> {
        load_region("palette", &mut self.palette, bytes)
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}

/// The 240x136 tile map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    data: Box<[u8]>,
}

impl TileMap {
    pub fn new() -> Self {
        Self {
            data: vec![0; MAP_BYTES].into_boxed_slice(),
        }
    }

    /// Cell value, or 0 outside the map.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= MAP_WIDTH || y >= MAP_HEIGHT {
            return 0;
        }
        self.data[(y * MAP_WIDTH + x) as usize]
    }

    /// Returns false (and writes nothing) outside the map.
    pub fn set(&mut self, x: i32, y: i32, value: u8) -> bool {
        if x < 0 || y < 0 || x >= MAP_WIDTH || y >= MAP_HEIGHT {
            return false;
        }
        self.data[(y * MAP_WIDTH + x) as usize] = value;
        true
    }

    /// Cell value with both coordinates wrapped into the map, so the map
    /// tiles the plane in every direction.
    #[inline]
    pub fn get_wrapped(&self, x: i32, y: i32) -> u8 {
        let x = x.rem_euclid(MAP_WIDTH);
        let y = y.rem_euclid(MAP_HEIGHT);
        self.data[(y * MAP_WIDTH + x) as usize]
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), MemoryError> {
        load_region("map", &mut self.data, bytes)
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new()
    }
}

/// One byte of 8 flag bits per tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    data: [u8; FLAGS],
}

impl Flags {
    pub fn new() -> Self {
        Self { data: [0; FLAGS] }
    }

    fn slot(index: i32, flag: u8) -> Option<usize> {
        if index < 0 || index as usize >= FLAGS || flag >= 8 {
            None
        } else {
            Some(index as usize)
        }
    }

    pub fn get(&self, index: i32, flag: u8) -> bool {
        Self::slot(index, flag).is_some_and(|i| self.data[i] & (1 << flag) != 0)
    }

    /// Out-of-range index or flag is ignored.
    pub fn set(&mut self, index: i32, flag: u8, value: bool) {
        let Some(i) = Self::slot(index, flag) else {
            log(LogCategory::Map, LogLevel::Debug, || {
                format!("fset ignored: tile {} flag {}", index, flag)
            });
            return;
        };
        if value {
            self.data[i] |= 1 << flag;
        } else {
            self.data[i] &= !(1 << flag);
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), MemoryError> {
        load_region("flags", &mut self.data, bytes)
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

/// Glyph cell size used for line height and fixed advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub width: u8,
    pub height: u8,
}

/// System font: 256 regular glyphs followed by 256 alternate glyphs, 1bpp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    data: Box<[u8]>,
    pub regular: FontMetrics,
    pub alt: FontMetrics,
}

impl Font {
    pub fn new() -> Self {
        Self {
            data: vec![0; FONT_BYTES].into_boxed_slice(),
            regular: FontMetrics {
                width: 6,
                height: 6,
            },
            alt: FontMetrics {
                width: 4,
                height: 6,
            },
        }
    }

    pub fn metrics(&self, alt: bool) -> FontMetrics {
        if alt {
            self.alt
        } else {
            self.regular
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), MemoryError> {
        load_region("font", &mut self.data, bytes)
    }

    /// Replace one glyph; rows are bytes with the leftmost pixel in bit 0.
    pub fn set_glyph(&mut self, alt: bool, code: u8, rows: [u8; 8]) {
        let start = (usize::from(alt) * FONT_CHARS + code as usize) * 8;
        self.data[start..start + 8].copy_from_slice(&rows);
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the drawing calls read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    pub vram: Vram,
    tiles: Box<[u8]>,
    pub font: Font,
    pub map: TileMap,
    pub flags: Flags,
}

impl Ram {
    pub fn new() -> Self {
        Self {
            vram: Vram::new(),
            tiles: vec![0; TILES_BYTES].into_boxed_slice(),
            font: Font::new(),
            map: TileMap::new(),
            flags: Flags::new(),
        }
    }

    /// Graphics region (background page then sprite page at 4bpp).
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [u8] {
        &mut self.tiles
    }

    pub fn load_tiles(&mut self, bytes: &[u8]) -> Result<(), MemoryError> {
        load_region("tiles", &mut self.tiles, bytes)
    }

    /// Write one pixel of a 4bpp tile (0-255 background, 256-511 sprites).
    pub fn set_tile_pixel(&mut self, index: usize, x: u8, y: u8, color: u8) {
        let size = TileFormat::Bpp4.tile_size();
        let start = (index % (TILES_BYTES / size)) * size;
        encode_pixel(TileFormat::Bpp4, &mut self.tiles[start..start + size], x, y, color);
    }

    /// The sheet a segment selects: font glyphs for 0-1, graphics otherwise.
    pub fn sheet(&self, segment: BlitSegment) -> TileSheet<'_> {
        if segment.is_font() {
            TileSheet::new(&self.font.data, segment)
        } else {
            TileSheet::new(&self.tiles, segment)
        }
    }

    /// The framebuffer for writing, alongside read-only views of the sheet
    /// selected by `segment` and the tile map.
    pub(crate) fn split(&mut self, segment: BlitSegment) -> (&mut Screen, TileSheet<'_>, &TileMap) {
        let sheet = if segment.is_font() {
            TileSheet::new(&self.font.data, segment)
        } else {
            TileSheet::new(&self.tiles, segment)
        };
        (&mut self.vram.screen, sheet, &self.map)
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}
