//! Tile and sprite blitting.
//!
//! [`draw_tile`] copies one 8x8 tile under an [`Orientation`] and an integer
//! scale. Multi-cell sprites move their cells as a block: the grid position
//! of each cell is remapped under the same flip/rotate before the cell
//! itself is drawn, and 90/270 degree rotations lay the grid out transposed.

use crate::orientation::{Flip, Orientation, Rotate};
use crate::palette::{Mapping, TRANSPARENT};
use crate::raster::Canvas;
use crate::tilesheet::TilePtr;
use crate::{Console, TILE_SIZE};
use fc_core::logging::{log, LogCategory, LogLevel};

#[derive(Debug, Clone, Copy)]
pub struct SpriteParams<'a> {
    /// Width in cells
    pub w: i32,
    /// Height in cells
    pub h: i32,
    pub scale: i32,
    pub flip: Flip,
    pub rotate: Rotate,
    /// Nominal colours to skip
    pub colorkey: &'a [u8],
}

impl Default for SpriteParams<'_> {
    fn default() -> Self {
        Self {
            w: 1,
            h: 1,
            scale: 1,
            flip: Flip::None,
            rotate: Rotate::R0,
            colorkey: &[],
        }
    }
}

/// Draw one tile with its top-left corner at `(x, y)`.
pub(crate) fn draw_tile(
    canvas: &mut Canvas<'_>,
    tile: TilePtr<'_>,
    x: i32,
    y: i32,
    mapping: &Mapping,
    scale: i32,
    orientation: Orientation,
) {
    let transform = orientation.transform();
    let clip = canvas.clip();

    if scale == 1 {
        // Clip the tile-local range once so the inner loop needs no checks
        let sx = clip.left.saturating_sub(x).max(0);
        let sy = clip.top.saturating_sub(y).max(0);
        let ex = clip.right.saturating_sub(x).min(TILE_SIZE);
        let ey = clip.bottom.saturating_sub(y).min(TILE_SIZE);

        for py in sy..ey {
            for px in sx..ex {
                let (ix, iy) = transform.source(px, py, TILE_SIZE);
                let color = mapping.get(tile.pixel(ix, iy));
                if color != TRANSPARENT {
                    canvas.set_pixel_fast(x + px, y + py, color);
                }
            }
        }
        return;
    }

    if scale < 1 {
        return;
    }
    let size = TILE_SIZE.saturating_mul(scale);
    if clip.rejects(x, y, size, size) {
        return;
    }

    for py in 0..TILE_SIZE {
        for px in 0..TILE_SIZE {
            let (ix, iy) = transform.source(px, py, TILE_SIZE);
            let color = mapping.get(tile.pixel(ix, iy));
            if color != TRANSPARENT {
                let dx = x.saturating_add(px.saturating_mul(scale));
                let dy = y.saturating_add(py.saturating_mul(scale));
                canvas.rect(dx, dy, scale, scale, color);
            }
        }
    }
}

/// Sheet-grid offset of the cell drawn at grid position `(i, j)` of a
/// `w` x `h` sprite.
pub fn cell_source(i: i32, j: i32, w: i32, h: i32, flip: Flip, rotate: Rotate) -> (i32, i32) {
    let mut mx = if flip.horizontal() { w - 1 - i } else { i };
    let mut my = if flip.vertical() { h - 1 - j } else { j };

    // Flips with matching axes (none, both) rotate one way, single flips
    // the other.
    let symmetric = matches!(flip, Flip::None | Flip::Both);
    match rotate {
        Rotate::R0 => {}
        Rotate::R180 => {
            mx = w - 1 - mx;
            my = h - 1 - my;
        }
        Rotate::R90 => {
            if symmetric {
                my = h - 1 - my;
            } else {
                mx = w - 1 - mx;
            }
        }
        Rotate::R270 => {
            if symmetric {
                mx = w - 1 - mx;
            } else {
                my = h - 1 - my;
            }
        }
    }
    (mx, my)
}

impl Console {
    /// Blit sprite `index` (and its neighbours for multi-cell sprites) from
    /// the active segment. Negative indices draw nothing.
    pub fn spr(&mut self, index: i32, x: i32, y: i32, params: SpriteParams<'_>) {
        if index < 0 {
            return;
        }

        let mapping = self.mapping(params.colorkey);
        let orientation = Orientation::new(params.flip, params.rotate);
        let segment = self.ram.vram.segment;
        let clip = self.clip;
        let (screen, sheet, _) = self.ram.split(segment);
        let mut canvas = Canvas::new(screen, clip);

        if params.w == 1 && params.h == 1 {
            let tile = sheet.tile(index, false);
            draw_tile(&mut canvas, tile, x, y, &mapping, params.scale, orientation);
            return;
        }

        let step = TILE_SIZE.saturating_mul(params.scale);
        let cols = sheet.cols() as i32;

        if clip.rejects(
            x,
            y,
            params.w.saturating_mul(step),
            params.h.saturating_mul(step),
        ) {
            log(LogCategory::Blit, LogLevel::Trace, || {
                format!("spr {} ({}x{}) clipped away at ({}, {})", index, params.w, params.h, x, y)
            });
            return;
        }

        let transposed = params.rotate.is_transposing();
        for i in 0..params.w {
            for j in 0..params.h {
                let (mx, my) = cell_source(i, j, params.w, params.h, params.flip, params.rotate);
                // Region tile counts are powers of two, so a wrapped index
                // still resolves to the same tile
                let cell = index.wrapping_add(mx).wrapping_add(my.wrapping_mul(cols));
                let tile = sheet.tile(cell, false);
                let (dx, dy) = if transposed { (j, i) } else { (i, j) };
                draw_tile(
                    &mut canvas,
                    tile,
                    x.saturating_add(dx.saturating_mul(step)),
                    y.saturating_add(dy.saturating_mul(step)),
                    &mapping,
                    params.scale,
                    orientation,
                );
            }
        }
    }
}
