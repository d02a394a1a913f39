//! Half-space triangle rasterization.
//!
//! Coverage is decided per pixel centre from three edge functions
//! normalised by the triangle area, i.e. the barycentric weights. The
//! weights are stepped incrementally across each row and down each
//! column. Covered pixels ask a [`Shader`] for their colour.

use crate::memory::{Screen, TileMap};
use crate::palette::{map_color, Mapping, TRANSPARENT};
use crate::raster::Canvas;
use crate::tilesheet::TileSheet;
use crate::{Console, HEIGHT, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE, WIDTH};
use fc_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

/// Sampling point inside a pixel. Slightly under one half so that pixel
/// centres lying exactly on a shared edge go to one triangle consistently.
const CENTER: f64 = 0.5 - 1e-7;

const MAP_PIXEL_WIDTH: i32 = MAP_WIDTH * TILE_SIZE;
const MAP_PIXEL_HEIGHT: i32 = MAP_HEIGHT * TILE_SIZE;

/// Screen position with texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TexVertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl TexVertex {
    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { x, y, u, v }
    }
}

/// Where a textured triangle samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureSource {
    /// The sheet selected by the active blit segment
    #[default]
    Sheet,
    /// The tile map, rendered through the active sheet
    Map,
    /// The inactive vbank's screen
    VBank,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vertex {
    x: f64,
    y: f64,
    u: f64,
    v: f64,
}

impl From<TexVertex> for Vertex {
    fn from(t: TexVertex) -> Self {
        Vertex {
            x: t.x.into(),
            y: t.y.into(),
            u: t.u.into(),
            v: t.v.into(),
        }
    }
}

impl Vertex {
    fn at(x: f32, y: f32) -> Self {
        Vertex {
            x: x.into(),
            y: y.into(),
            u: 0.0,
            v: 0.0,
        }
    }
}

#[inline]
fn edge(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Per-pixel colour source. Returns [`TRANSPARENT`] to discard a pixel.
pub(crate) enum Shader<'a> {
    Solid(u8),
    Sheet {
        sheet: TileSheet<'a>,
        mapping: Mapping,
    },
    Map {
        sheet: TileSheet<'a>,
        map: &'a TileMap,
        mapping: Mapping,
    },
    VBank {
        screen: &'a Screen,
        mapping: Mapping,
    },
}

impl Shader<'_> {
    #[inline]
    fn shade(&self, weights: &[f64; 3], vertices: &[Vertex; 3]) -> u8 {
        let uv = || {
            let (mut u, mut v) = (0.0, 0.0);
            for (w, vertex) in weights.iter().zip(vertices) {
                u += w * vertex.u;
                v += w * vertex.v;
            }
            (u as i32, v as i32)
        };

        match self {
            Shader::Solid(color) => *color,
            Shader::Sheet { sheet, mapping } => {
                let (u, v) = uv();
                mapping.get(sheet.pixel(u, v))
            }
            Shader::Map {
                sheet,
                map,
                mapping,
            } => {
                let (u, v) = uv();
                let u = u.rem_euclid(MAP_PIXEL_WIDTH);
                let v = v.rem_euclid(MAP_PIXEL_HEIGHT);
                let index = map.get_wrapped(u / TILE_SIZE, v / TILE_SIZE);
                let tile = sheet.tile(i32::from(index), true);
                mapping.get(tile.pixel(u % TILE_SIZE, v % TILE_SIZE))
            }
            Shader::VBank { screen, mapping } => {
                let (u, v) = uv();
                let u = u.rem_euclid(WIDTH);
                let v = v.rem_euclid(HEIGHT);
                mapping.get(screen.peek4((v * WIDTH + u) as usize))
            }
        }
    }
}

fn rasterize(canvas: &mut Canvas<'_>, vertices: [Vertex; 3], shader: &Shader<'_>) {
    let mut v = vertices;
    let clip = canvas.clip();

    let min_x = v.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = v.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = v.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = v.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let min_x = (min_x.floor() as i32).max(clip.left);
    let min_y = (min_y.floor() as i32).max(clip.top);
    let max_x = (max_x.ceil() as i32).min(clip.right);
    let max_y = (max_y.ceil() as i32).min(clip.bottom);
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    let pos = |p: &Vertex| (p.x, p.y);
    let mut area = edge(pos(&v[0]), pos(&v[1]), pos(&v[2]));
    if area.floor() as i32 == 0 {
        log(LogCategory::Shape, LogLevel::Trace, || {
            format!("degenerate triangle skipped (area {})", area)
        });
        return;
    }
    if area < 0.0 {
        v.swap(1, 2);
        area = -area;
    }

    let origin = (f64::from(min_x) + CENTER, f64::from(min_y) + CENTER);
    let mut step = [(0.0, 0.0); 3];
    let mut row_start = [0.0; 3];
    for i in 0..3 {
        let (c, n) = ((i + 1) % 3, (i + 2) % 3);
        step[i] = ((v[c].y - v[n].y) / area, (v[n].x - v[c].x) / area);
        row_start[i] = edge(pos(&v[c]), pos(&v[n]), origin) / area;
    }

    for y in min_y..max_y {
        let mut w = row_start;
        for x in min_x..max_x {
            if w[0] >= 0.0 && w[1] >= 0.0 && w[2] >= 0.0 {
                let color = shader.shade(&w, &v);
                if color != TRANSPARENT {
                    canvas.set_pixel_fast(x, y, color);
                }
            }
            for i in 0..3 {
                w[i] += step[i].0;
            }
        }
        for i in 0..3 {
            row_start[i] += step[i].1;
        }
    }
}

impl Console {
    /// Filled triangle in a single colour.
    #[allow(clippy::too_many_arguments)]
    pub fn tri(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, color: u8) {
        let shader = Shader::Solid(map_color(&self.ram.vram.mapping, color));
        let vertices = [Vertex::at(x1, y1), Vertex::at(x2, y2), Vertex::at(x3, y3)];
        rasterize(&mut self.canvas(), vertices, &shader);
    }

    /// Triangle outline, drawn as three lines.
    #[allow(clippy::too_many_arguments)]
    pub fn trib(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, color: u8) {
        let color = map_color(&self.ram.vram.mapping, color);
        let mut canvas = self.canvas();
        canvas.line(x1, y1, x2, y2, color);
        canvas.line(x2, y2, x3, y3, color);
        canvas.line(x3, y3, x1, y1, color);
    }

    /// Textured triangle; `colorkey` colours of the texture are skipped.
    pub fn textri(&mut self, vertices: [TexVertex; 3], source: TextureSource, colorkey: &[u8]) {
        let mapping = self.mapping(colorkey);
        let segment = self.ram.vram.segment;
        let clip = self.clip;
        let (screen, sheet, map) = self.ram.split(segment);
        let shader = match source {
            TextureSource::Sheet => Shader::Sheet { sheet, mapping },
            TextureSource::Map => Shader::Map {
                sheet,
                map,
                mapping,
            },
            TextureSource::VBank => Shader::VBank {
                screen: &self.bank.screen,
                mapping,
            },
        };
        rasterize(&mut Canvas::new(screen, clip), vertices.map(Vertex::from), &shader);
    }
}
