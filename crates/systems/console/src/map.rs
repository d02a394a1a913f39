//! Tile-map compositing, map cells and tile flags.

use crate::blit::draw_tile;
use crate::orientation::{Flip, Orientation, Rotate};
use crate::raster::Canvas;
use crate::{Console, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE};
use fc_core::logging::{log, LogCategory, LogLevel};

/// What a map cell draws as. A remap hook may rewrite any field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapResult {
    pub index: u8,
    pub flip: Flip,
    pub rotate: Rotate,
}

/// Per-cell override hook, called with wrapped map coordinates.
pub trait Remap {
    fn remap(&mut self, x: i32, y: i32, result: &mut RemapResult);
}

impl<F> Remap for F
where
    F: FnMut(i32, i32, &mut RemapResult),
{
    fn remap(&mut self, x: i32, y: i32, result: &mut RemapResult) {
        self(x, y, result)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MapParams<'a> {
    /// First map cell column
    pub x: i32,
    /// First map cell row
    pub y: i32,
    /// Cells across
    pub w: i32,
    /// Cells down
    pub h: i32,
    /// Screen position of the first cell
    pub sx: i32,
    pub sy: i32,
    pub colorkey: &'a [u8],
    pub scale: i32,
}

impl Default for MapParams<'_> {
    /// One screenful from the map origin.
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            w: 30,
            h: 17,
            sx: 0,
            sy: 0,
            colorkey: &[],
            scale: 1,
        }
    }
}

impl Console {
    /// Draw a region of the tile map. Cell coordinates wrap in both
    /// directions, so negative or oversized offsets tile the map.
    pub fn map(&mut self, params: MapParams<'_>, mut remap: Option<&mut dyn Remap>) {
        let mapping = self.mapping(params.colorkey);
        let segment = self.ram.vram.segment;
        let clip = self.clip;
        let (screen, sheet, map) = self.ram.split(segment);
        let mut canvas = Canvas::new(screen, clip);

        let size = TILE_SIZE.saturating_mul(params.scale);
        let mx0 = params.x.rem_euclid(MAP_WIDTH);
        let my0 = params.y.rem_euclid(MAP_HEIGHT);

        for j in 0..params.h {
            let my = (my0 + j % MAP_HEIGHT) % MAP_HEIGHT;
            let dy = params.sy.saturating_add(j.saturating_mul(size));
            for i in 0..params.w {
                let mx = (mx0 + i % MAP_WIDTH) % MAP_WIDTH;
                let dx = params.sx.saturating_add(i.saturating_mul(size));

                let mut cell = RemapResult {
                    index: map.get_wrapped(mx, my),
                    flip: Flip::None,
                    rotate: Rotate::R0,
                };
                if let Some(hook) = remap.as_deref_mut() {
                    hook.remap(mx, my, &mut cell);
                }

                let tile = sheet.tile(i32::from(cell.index), true);
                let orientation = Orientation::new(cell.flip, cell.rotate);
                draw_tile(&mut canvas, tile, dx, dy, &mapping, params.scale, orientation);
            }
        }
    }

    /// Map cell at `(x, y)`; 0 outside the map.
    pub fn mget(&self, x: i32, y: i32) -> u8 {
        self.ram.map.get(x, y)
    }

    /// Out-of-range writes are ignored.
    pub fn mset(&mut self, x: i32, y: i32, value: u8) {
        if !self.ram.map.set(x, y, value) {
            log(LogCategory::Map, LogLevel::Debug, || {
                format!("mset ignored outside map: ({}, {})", x, y)
            });
        }
    }

    pub fn fget(&self, index: i32, flag: u8) -> bool {
        self.ram.flags.get(index, flag)
    }

    pub fn fset(&mut self, index: i32, flag: u8, value: bool) {
        self.ram.flags.set(index, flag, value);
    }
}
