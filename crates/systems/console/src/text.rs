//! Bitmap text.
//!
//! Glyphs are ordinary 8x8 tiles. Proportional text trims blank columns
//! from both sides of each glyph and advances by the trimmed width plus
//! one; fixed-width text advances by the cell width. Both return the width
//! of the widest line.

use crate::palette::{map_color, Mapping, TRANSPARENT};
use crate::raster::Canvas;
use crate::tilesheet::{BlitSegment, TilePtr, TileSheet};
use crate::{Console, FONT_CHARS, TILE_SIZE};
use fc_core::logging::{log, LogCategory, LogLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintParams {
    pub color: u8,
    pub fixed: bool,
    pub scale: i32,
    /// Use the alternate (narrow) glyph set
    pub alt: bool,
}

impl Default for PrintParams {
    fn default() -> Self {
        Self {
            color: 15,
            fixed: false,
            scale: 1,
            alt: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontParams<'a> {
    pub colorkey: &'a [u8],
    /// Fixed advance and blank-glyph advance
    pub w: i32,
    /// Line height
    pub h: i32,
    pub fixed: bool,
    pub scale: i32,
    pub alt: bool,
}

impl Default for FontParams<'_> {
    fn default() -> Self {
        Self {
            colorkey: &[],
            w: 8,
            h: 8,
            fixed: false,
            scale: 1,
            alt: false,
        }
    }
}

/// Cell metrics for one text run.
struct Layout {
    width: i32,
    height: i32,
    fixed: bool,
    scale: i32,
    alt: bool,
}

/// Draw one glyph and return its unscaled width.
fn draw_char(
    canvas: &mut Canvas<'_>,
    glyph: TilePtr<'_>,
    x: i32,
    y: i32,
    layout: &Layout,
    mapping: &Mapping,
) -> i32 {
    let blank = |col: i32| (0..TILE_SIZE).all(|row| mapping.is_transparent(glyph.pixel(col, row)));

    let (mut start, mut end) = (0, TILE_SIZE);
    if !layout.fixed {
        while start < TILE_SIZE && blank(start) {
            start += 1;
        }
        while end > start && blank(end - 1) {
            end -= 1;
        }
    }
    let width = end - start;

    let scale = layout.scale;
    let size = TILE_SIZE.saturating_mul(scale);
    if canvas.clip().rejects(x, y, size, size) {
        return width;
    }

    for (i, col) in (start..end).enumerate() {
        let xs = x.saturating_add((i as i32).saturating_mul(scale));
        for row in 0..TILE_SIZE {
            let color = mapping.get(glyph.pixel(col, row));
            if color != TRANSPARENT {
                canvas.rect(xs, y.saturating_add(row.saturating_mul(scale)), scale, scale, color);
            }
        }
    }
    width
}

fn draw_text(
    canvas: &mut Canvas<'_>,
    sheet: &TileSheet<'_>,
    text: &str,
    x: i32,
    y: i32,
    layout: &Layout,
    mapping: &Mapping,
) -> i32 {
    let mut pos = x;
    let mut widest = x;
    let mut y = y;
    let bank = if layout.alt { FONT_CHARS as i32 } else { 0 };

    for byte in text.bytes() {
        if byte == b'\n' {
            widest = widest.max(pos);
            pos = x;
            y = y.saturating_add(layout.height.saturating_mul(layout.scale));
            continue;
        }

        let glyph = sheet.tile(bank + i32::from(byte), false);
        let size = draw_char(canvas, glyph, pos, y, layout, mapping);
        let advance = if !layout.fixed && size != 0 {
            size + 1
        } else {
            layout.width
        };
        pos = pos.saturating_add(advance.saturating_mul(layout.scale));
    }

    widest.max(pos).saturating_sub(x)
}

impl Console {
    /// Draw `text` with the system font and return its width in pixels.
    pub fn print(&mut self, text: &str, x: i32, y: i32, params: PrintParams) -> i32 {
        let color = map_color(&self.ram.vram.mapping, params.color);
        let mapping = Mapping::from_entries(&[TRANSPARENT, color]);
        let metrics = self.ram.font.metrics(params.alt);

        // Proportional text treats a blank glyph as a narrow space
        let width = i32::from(metrics.width) - if params.fixed { 0 } else { 2 };
        let layout = Layout {
            width,
            height: metrics.height.into(),
            fixed: params.fixed,
            scale: params.scale,
            alt: params.alt,
        };

        let clip = self.clip;
        let (screen, sheet, _) = self.ram.split(BlitSegment::FONT);
        let width = draw_text(&mut Canvas::new(screen, clip), &sheet, text, x, y, &layout, &mapping);
        log(LogCategory::Text, LogLevel::Trace, || {
            format!("print {:?} at ({}, {}): {} px", text, x, y, width)
        });
        width
    }

    /// Draw `text` with glyphs taken from the graphics sheet.
    ///
    /// Reads the page opposite the active segment, so sprite-page glyphs
    /// are used while backgrounds are selected and vice versa.
    pub fn font(&mut self, text: &str, x: i32, y: i32, params: FontParams<'_>) -> i32 {
        let mapping = self.mapping(params.colorkey);
        let layout = Layout {
            width: params.w,
            height: params.h,
            fixed: params.fixed,
            scale: params.scale,
            alt: params.alt,
        };

        let segment = self.ram.vram.segment.font_target();
        let clip = self.clip;
        let (screen, sheet, _) = self.ram.split(segment);
        draw_text(&mut Canvas::new(screen, clip), &sheet, text, x, y, &layout, &mapping)
    }
}
