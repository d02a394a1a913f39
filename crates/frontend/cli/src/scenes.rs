//! Built-in scenes and the procedural assets they draw with.

use clap::ValueEnum;
use fc_console::memory::MemoryError;
use fc_console::{
    BlitSegment, Console, Flip, FontParams, MapParams, PrintParams, RemapResult, Rotate,
    SpriteParams, TexVertex, TextureSource, MAP_HEIGHT, MAP_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scene {
    Demo,
    Shapes,
    Sprites,
    Map,
    Text,
}

const BRICK: u8 = 1;
const CHECKER: u8 = 2;
const GRASS: u8 = 3;
const WATER: u8 = 4;

/// Sprite page: 2x2 face at 0, arrow at 2.
const FACE: i32 = 0;
const ARROW: i32 = 2;

/// Flag 0 marks solid tiles.
const SOLID: u8 = 0;

/// 3x5 glyphs, most significant bit leftmost.
#[rustfmt::skip]
const GLYPHS: &[(u8, [u8; 5])] = &[
    (b'A', [0b010, 0b101, 0b111, 0b101, 0b101]), (b'B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    (b'C', [0b011, 0b100, 0b100, 0b100, 0b011]), (b'D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    (b'E', [0b111, 0b100, 0b110, 0b100, 0b111]), (b'F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    (b'G', [0b011, 0b100, 0b101, 0b101, 0b011]), (b'H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    (b'I', [0b111, 0b010, 0b010, 0b010, 0b111]), (b'J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    (b'K', [0b101, 0b101, 0b110, 0b101, 0b101]), (b'L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    (b'M', [0b101, 0b111, 0b111, 0b101, 0b101]), (b'N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    (b'O', [0b010, 0b101, 0b101, 0b101, 0b010]), (b'P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    (b'Q', [0b010, 0b101, 0b101, 0b110, 0b011]), (b'R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    (b'S', [0b011, 0b100, 0b010, 0b001, 0b110]), (b'T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    (b'U', [0b101, 0b101, 0b101, 0b101, 0b111]), (b'V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    (b'W', [0b101, 0b101, 0b111, 0b111, 0b101]), (b'X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    (b'Y', [0b101, 0b101, 0b010, 0b010, 0b010]), (b'Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    (b'0', [0b111, 0b101, 0b101, 0b101, 0b111]), (b'1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    (b'2', [0b110, 0b001, 0b010, 0b100, 0b111]), (b'3', [0b110, 0b001, 0b010, 0b001, 0b110]),
    (b'4', [0b101, 0b101, 0b111, 0b001, 0b001]), (b'5', [0b111, 0b100, 0b110, 0b001, 0b110]),
    (b'6', [0b011, 0b100, 0b111, 0b101, 0b111]), (b'7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    (b'8', [0b111, 0b101, 0b111, 0b101, 0b111]), (b'9', [0b111, 0b101, 0b111, 0b001, 0b110]),
    (b'!', [0b010, 0b010, 0b010, 0b000, 0b010]), (b'.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (b':', [0b000, 0b010, 0b000, 0b010, 0b000]), (b'-', [0b000, 0b000, 0b111, 0b000, 0b000]),
];

/// Font rows have the leftmost pixel in bit 0.
fn glyph_rows(rows: [u8; 5]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (dst, bits) in out.iter_mut().zip(rows) {
        *dst = ((bits >> 2) & 1) | (bits & 2) | ((bits & 1) << 2);
    }
    out
}

fn paint_tile(console: &mut Console, index: usize, pixel: impl Fn(u8, u8) -> u8) {
    for y in 0..8 {
        for x in 0..8 {
            console.ram.set_tile_pixel(index, x, y, pixel(x, y));
        }
    }
}

/// Populate font, tiles, sprites, map and flags.
pub fn load_assets(console: &mut Console) -> Result<(), MemoryError> {
    for &(code, rows) in GLYPHS {
        let rows = glyph_rows(rows);
        console.ram.font.set_glyph(false, code, rows);
        console.ram.font.set_glyph(false, code.to_ascii_lowercase(), rows);
    }

    paint_tile(console, BRICK.into(), |x, y| {
        let offset = if (y / 4) % 2 == 0 { 0 } else { 4 };
        if y % 4 == 3 || (x + offset) % 8 == 0 {
            15
        } else {
            2
        }
    });
    paint_tile(console, CHECKER.into(), |x, y| if (x / 2 + y / 2) % 2 == 0 { 13 } else { 14 });
    paint_tile(console, GRASS.into(), |x, y| if (x * 5 + y * 3) % 7 == 0 { 7 } else { 6 });
    paint_tile(console, WATER.into(), |x, y| if (x + 2 * y) % 8 < 2 { 11 } else { 10 });

    // 16x16 face over sprite cells 0, 1, 16, 17
    for cy in 0..2u8 {
        for cx in 0..2u8 {
            let index = 256 + FACE as usize + usize::from(cx) + usize::from(cy) * 16;
            paint_tile(console, index, |x, y| {
                let (px, py) = (i32::from(cx * 8 + x) * 2 - 15, i32::from(cy * 8 + y) * 2 - 15);
                let d = px * px + py * py;
                let eye = (px.abs() - 6).pow(2) + (py + 5).pow(2) < 10;
                let mouth = py > 3 && py < 9 && px.abs() < 9 && d > 60;
                if d > 225 {
                    0
                } else if eye || mouth {
                    12
                } else {
                    4
                }
            });
        }
    }
    // Arrow pointing right
    paint_tile(console, 256 + ARROW as usize, |x, y| {
        let (x, dy) = (i32::from(x), (2 * i32::from(y) - 7).abs());
        let shaft = x < 4 && dy == 1;
        let head = x >= 4 && dy < 2 * (7 - x);
        if shaft || head {
            9
        } else {
            0
        }
    });

    let mut map = Vec::with_capacity((MAP_WIDTH * MAP_HEIGHT) as usize);
    for y in 0..MAP_HEIGHT {
        for x in 0..MAP_WIDTH {
            let cell = match (x % 30, y % 17) {
                (_, 0) | (_, 16) | (0, _) | (29, _) => BRICK,
                (10..=19, 8..=10) => WATER,
                (x, y) if (x + y) % 9 == 0 => CHECKER,
                _ => GRASS,
            };
            map.push(cell);
        }
    }
    console.ram.map.load(&map)?;
    console.ram.flags.load(&[0, 1 << SOLID, 0, 0, 0])?;
    Ok(())
}

pub fn draw(scene: Scene, console: &mut Console) {
    match scene {
        Scene::Demo => demo(console),
        Scene::Shapes => shapes(console),
        Scene::Sprites => sprites(console),
        Scene::Map => map(console),
        Scene::Text => text(console),
    }
}

fn shapes(console: &mut Console) {
    console.cls(0);
    console.rect(8, 8, 40, 24, 2);
    console.rectb(4, 4, 48, 32, 12);
    console.circ(90, 30, 20, 4);
    console.circb(90, 30, 24, 12);
    console.elli(160, 30, 36, 14, 9);
    console.ellib(160, 30, 40, 18, 10);
    console.tri(20.0, 120.0, 60.0, 60.0, 100.0, 120.0, 6);
    console.trib(20.0, 120.0, 60.0, 60.0, 100.0, 120.0, 12);

    for i in 0..16 {
        let angle = i as f32 / 16.0 * std::f32::consts::TAU;
        let (x, y) = (180.0 + angle.cos() * 40.0, 95.0 + angle.sin() * 30.0);
        console.line(180.0, 95.0, x, y, (i % 15 + 1) as u8);
    }

    console.clip(120, 60, 20, 60);
    console.circ(130, 90, 30, 3);
    console.reset_clip();
    console.rectb(119, 59, 22, 62, 13);
}

fn sprites(console: &mut Console) {
    console.cls(1);
    console.set_segment(BlitSegment::SPRITES);

    let flips = [Flip::None, Flip::Horizontal, Flip::Vertical, Flip::Both];
    for (i, flip) in flips.into_iter().enumerate() {
        for q in 0..4 {
            let (x, y) = (8 + q * 12, 8 + i as i32 * 12);
            let params = SpriteParams { flip, rotate: Rotate::from_quarters(q), colorkey: &[0], ..Default::default() };
            console.spr(ARROW, x, y, params);
        }
    }

    for scale in 1..=3 {
        let x = 70 + (scale - 1) * (scale + 2) * 12;
        let params = SpriteParams { w: 2, h: 2, scale, colorkey: &[0], ..Default::default() };
        console.spr(FACE, x, 8, params);
    }

    for q in 0..4 {
        let params = SpriteParams { w: 2, h: 2, scale: 2, rotate: Rotate::from_quarters(q), colorkey: &[0], ..Default::default() };
        console.spr(FACE, 70 + q * 40, 80, params);
    }

    // Recolour the face without touching the sheet
    console.color_map_mut().set(4, 11);
    let params = SpriteParams { w: 2, h: 2, colorkey: &[0], ..Default::default() };
    console.spr(FACE, 20, 100, params);
    console.color_map_mut().reset();
    console.set_segment(BlitSegment::TILES);
}

fn map(console: &mut Console) {
    console.cls(0);
    let mut remapped = 0;
    let mut ripple = |x: i32, y: i32, cell: &mut RemapResult| {
        if cell.index == WATER && (x + y) % 2 == 0 {
            cell.flip = Flip::Horizontal;
        }
        remapped += 1;
    };
    console.map(MapParams { x: -4, y: -2, ..Default::default() }, Some(&mut ripple));
    log::debug!("remap hook saw {} cells", remapped);

    console.clip(140, 70, 96, 62);
    console.map(MapParams { x: 10, y: 8, w: 6, h: 4, sx: 140, sy: 70, scale: 2, ..Default::default() }, None);
    console.reset_clip();
    console.rectb(139, 69, 98, 64, 12);

    let solid = (0..MAP_WIDTH)
        .filter(|&x| console.fget(i32::from(console.mget(x, 0)), SOLID))
        .count();
    log::debug!("{} solid cells on the top row", solid);
}

fn text(console: &mut Console) {
    console.cls(0);
    let mut y = 4;
    for (scale, color) in [(1, 12), (2, 4), (3, 9)] {
        let width = console.print("HELLO WORLD!", 4, y, PrintParams { color, scale, ..Default::default() });
        console.rectb(3, y - 1, width + 2, 6 * scale + 2, 13);
        y += 8 * scale;
    }

    let fixed = PrintParams { color: 6, fixed: true, ..Default::default() };
    console.print("FIXED 0123456789\nSECOND LINE", 4, y + 4, fixed);

    // Glyphs for font() come from the sprite page when backgrounds are active
    console.set_segment(BlitSegment::TILES);
    let params = FontParams { colorkey: &[0], w: 9, scale: 2, ..Default::default() };
    console.font("\u{2}\u{2}\u{2}", 4, 110, params);
}

fn demo(console: &mut Console) {
    // Off-screen bank holds a pattern for the VBank texture
    console.vbank(1);
    console.cls(0);
    for i in 0..12 {
        console.circ(20 + i * 20, 68, 9, (i % 15 + 1) as u8);
    }
    console.vbank(0);

    console.map(MapParams::default(), None);

    console.textri(
        [
            TexVertex::new(150.0, 10.0, 0.0, 0.0),
            TexVertex::new(230.0, 30.0, 64.0, 0.0),
            TexVertex::new(170.0, 80.0, 0.0, 64.0),
        ],
        TextureSource::Map,
        &[],
    );
    console.textri(
        [
            TexVertex::new(20.0, 90.0, 0.0, 40.0),
            TexVertex::new(120.0, 90.0, 240.0, 40.0),
            TexVertex::new(70.0, 130.0, 120.0, 100.0),
        ],
        TextureSource::VBank,
        &[0],
    );

    console.set_segment(BlitSegment::SPRITES);
    console.spr(FACE, 40, 30, SpriteParams { w: 2, h: 2, scale: 2, colorkey: &[0], ..Default::default() });
    console.spr(ARROW, 80, 40, SpriteParams { rotate: Rotate::R90, colorkey: &[0], ..Default::default() });
    console.set_segment(BlitSegment::TILES);

    console.circb(120, 68, 30, 12);
    let width = console.print("FC DEMO", 0, 4, PrintParams { scale: 2, ..Default::default() });
    console.rect(4 + width, 6, 4, 4, 4);
}
