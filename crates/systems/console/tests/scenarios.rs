//! Whole-engine behaviour through the public drawing API
//!
//! Covers:
//! - clip post-conditions for every primitive
//! - orientation laws for tile blits
//! - transparency, degenerate input and map wrap-around scenarios

use fc_console::{
    ClipRect, Console, Flip, FontParams, MapParams, PrintParams, RemapResult, Rotate, SpriteParams,
    TexVertex, TextureSource, HEIGHT, MAP_HEIGHT, MAP_WIDTH, WIDTH,
};
use fc_core::logging::{LogCategory, LogConfig, LogLevel};

/// Tile 0: every pixel distinct enough to expose any transform mistake.
fn patterned_console() -> Console {
    let mut console = Console::new();
    for y in 0..8u8 {
        for x in 0..8u8 {
            console.ram.set_tile_pixel(0, x, y, (x * 3 + y * 5) % 15 + 1);
        }
    }
    console
}

fn block(console: &Console, x0: i32, y0: i32) -> [[u8; 8]; 8] {
    let mut out = [[0; 8]; 8];
    for (y, row) in out.iter_mut().enumerate() {
        for (x, px) in row.iter_mut().enumerate() {
            *px = console.pix(x0 + x as i32, y0 + y as i32);
        }
    }
    out
}

fn sprite(console: &mut Console, x: i32, y: i32, flip: Flip, rotate: Rotate) {
    console.spr(0, x, y, SpriteParams { flip, rotate, ..Default::default() });
}

#[test]
fn test_every_primitive_stays_inside_clip() {
    let mut console = patterned_console();
    for y in 0..8u8 {
        for x in 0..8u8 {
            console.ram.set_tile_pixel(256, x, y, 7);
        }
    }
    console.ram.font.set_glyph(false, b'X', [0xFF; 8]);
    for y in 0..8u8 {
        for x in 0..8u8 {
            console.ram.set_tile_pixel(256 + usize::from(b'X'), x, y, 8);
        }
    }
    for x in 0..MAP_WIDTH {
        console.mset(x, 0, 0);
    }
    console.vbank(1);
    console.cls(9);
    console.vbank(0);

    console.cls(0);
    console.clip(50, 40, 60, 30);
    let clip = console.clip_rect();

    console.cls(11);
    console.pix_set(49, 39, 12);
    console.pix_set(110, 55, 12);
    console.pix_set(60, 50, 12);

    let big = SpriteParams { w: 4, h: 4, scale: 3, ..Default::default() };
    console.rect(-10, -10, 300, 300, 1);
    console.rectb(30, 30, 100, 60, 2);
    console.line(0.0, 0.0, 239.0, 135.0, 3);
    console.circ(80, 55, 70, 4);
    console.ellib(80, 55, 50, 20, 5);
    console.tri(-20.0, 0.0, 260.0, 20.0, 100.0, 150.0, 6);
    console.trib(-20.0, 0.0, 260.0, 20.0, 100.0, 150.0, 7);
    console.spr(0, 45, 35, big);
    console.map(MapParams { x: -3, y: -3, w: 40, h: 20, scale: 2, ..Default::default() }, None);
    console.print("XXXXXXXXXXXXXXXXXXXXX", 40, 60, PrintParams { scale: 2, ..Default::default() });
    console.textri(
        [
            TexVertex::new(0.0, 0.0, 0.0, 0.0),
            TexVertex::new(240.0, 0.0, 64.0, 0.0),
            TexVertex::new(0.0, 136.0, 0.0, 64.0),
        ],
        TextureSource::Sheet,
        &[],
    );
    console.circb(80, 55, 35, 13);
    console.elli(80, 55, 45, 25, 14);
    console.font("XXXXXXXXXXXXXXXXXXXXX", 30, 45, FontParams { scale: 2, ..Default::default() });
    for source in [TextureSource::Map, TextureSource::VBank] {
        console.textri(
            [
                TexVertex::new(-30.0, -30.0, 0.0, 0.0),
                TexVertex::new(270.0, -30.0, 300.0, 0.0),
                TexVertex::new(-30.0, 166.0, 0.0, 196.0),
            ],
            source,
            &[],
        );
    }
    for flip in [Flip::None, Flip::Horizontal, Flip::Vertical, Flip::Both] {
        for rotate in [Rotate::R0, Rotate::R90, Rotate::R180, Rotate::R270] {
            for scale in [1, 2] {
                let params = SpriteParams { w: 3, h: 2, scale, flip, rotate, ..Default::default() };
                console.spr(0, 40, 30, params);
                console.spr(0, 100, 60, params);
            }
        }
    }

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if !clip.contains(x, y) {
                assert_eq!(console.pix(x, y), 0, "write outside clip at ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn test_identity_blit_is_raw_copy() {
    let mut console = patterned_console();
    sprite(&mut console, 100, 60, Flip::None, Rotate::R0);

    let sheet = console.ram.sheet(console.segment());
    let tile = sheet.tile(0, false);
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(console.pix(100 + x, 60 + y), tile.pixel(x, y));
        }
    }
}

#[test]
fn test_horizontal_flip_mirrors_rows() {
    let mut console = patterned_console();
    // Colour 0 is keyed, so draw on two separate spots
    console.spr(0, 0, 0, SpriteParams { colorkey: &[0], ..Default::default() });
    console.spr(0, 20, 0, SpriteParams { colorkey: &[0], flip: Flip::Horizontal, ..Default::default() });

    let plain = block(&console, 0, 0);
    let flipped = block(&console, 20, 0);
    for y in 0..8 {
        let mut mirrored = plain[y];
        mirrored.reverse();
        assert_eq!(flipped[y], mirrored);
    }
}

#[test]
fn test_orientation_involution_laws() {
    let mut reference = patterned_console();
    sprite(&mut reference, 0, 0, Flip::None, Rotate::R0);
    let original = block(&reference, 0, 0);

    // Flipping the flipped image back through a second H flip restores it
    let mut console = patterned_console();
    sprite(&mut console, 0, 0, Flip::Horizontal, Rotate::R0);
    let once = block(&console, 0, 0);
    for y in 0..8 {
        for x in 0..8 {
            console.ram.set_tile_pixel(1, x as u8, y as u8, once[y][x]);
        }
    }
    console.spr(1, 20, 0, SpriteParams { flip: Flip::Horizontal, ..Default::default() });
    assert_eq!(block(&console, 20, 0), original);

    // Four quarter turns
    let mut console = patterned_console();
    let mut current = original;
    for _ in 0..4 {
        for y in 0..8 {
            for x in 0..8 {
                console.ram.set_tile_pixel(2, x as u8, y as u8, current[y][x]);
            }
        }
        console.spr(2, 40, 0, SpriteParams { rotate: Rotate::R90, ..Default::default() });
        current = block(&console, 40, 0);
    }
    assert_eq!(current, original);
}

#[test]
fn test_rotate_180_equals_flip_both() {
    let mut a = patterned_console();
    let mut b = patterned_console();
    sprite(&mut a, 8, 8, Flip::None, Rotate::R180);
    sprite(&mut b, 8, 8, Flip::Both, Rotate::R0);
    assert_eq!(block(&a, 8, 8), block(&b, 8, 8));
}

#[test]
fn test_fully_keyed_tile_leaves_destination() {
    let mut console = patterned_console();
    for x in 0..WIDTH {
        console.pix_set(x, 3, (x % 16) as u8);
    }
    let before = console.screen().clone();

    let all: Vec<u8> = (0..16).collect();
    for (flip, rotate) in [(Flip::None, Rotate::R0), (Flip::Both, Rotate::R270)] {
        console.spr(0, 0, 0, SpriteParams { colorkey: &all, flip, rotate, ..Default::default() });
        console.spr(0, 50, 0, SpriteParams { colorkey: &all, scale: 3, flip, rotate, ..Default::default() });
    }
    assert_eq!(console.screen(), &before);
}

#[test]
fn test_collinear_triangle_writes_nothing() {
    let mut console = Console::new();
    console.tri(10.0, 10.0, 50.0, 30.0, 90.0, 50.0, 8);
    console.textri(
        [
            TexVertex::new(0.0, 0.0, 0.0, 0.0),
            TexVertex::new(100.0, 0.0, 8.0, 0.0),
            TexVertex::new(200.0, 0.0, 8.0, 8.0),
        ],
        TextureSource::Map,
        &[],
    );
    assert!(console.screen().pixels().all(|p| p == 0));
}

#[test]
fn test_rect_then_pix_scenario() {
    let mut console = Console::new();
    console.cls(9);
    console.clip(0, 0, WIDTH, HEIGHT);
    console.rect(10, 10, 5, 5, 2);
    assert_eq!(console.pix(12, 12), 2);
    assert_eq!(console.pix(20, 20), 9);
}

#[test]
fn test_negative_map_offset_wraps() {
    let mut console = Console::new();
    for y in 0..8u8 {
        for x in 0..8u8 {
            console.ram.set_tile_pixel(1, x, y, 11);
        }
    }
    console.mset(MAP_WIDTH - 2, MAP_HEIGHT - 1, 1);

    let mut seen = Vec::new();
    let mut hook = |x: i32, y: i32, _: &mut RemapResult| seen.push((x, y));
    console.map(
        MapParams { x: -2, y: -1, w: 3, h: 1, ..Default::default() },
        Some(&mut hook),
    );

    assert_eq!(
        seen,
        vec![(MAP_WIDTH - 2, MAP_HEIGHT - 1), (MAP_WIDTH - 1, MAP_HEIGHT - 1), (0, MAP_HEIGHT - 1)]
    );
    assert_eq!(console.pix(0, 0), 11);
    assert_eq!(console.pix(8, 0), 0);
}

#[test]
fn test_drawing_with_logging_enabled() {
    let config = LogConfig::global();
    config.set_level(LogCategory::Shape, LogLevel::Trace);
    config.set_level(LogCategory::Blit, LogLevel::Trace);
    config.set_level(LogCategory::Draw, LogLevel::Debug);

    let mut console = Console::new();
    console.tri(0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 1);
    console.spr(0, -100, -100, SpriteParams { w: 2, h: 2, ..Default::default() });
    console.elli(10, 10, 0, 4, 1);
    console.circb(10, 10, 3_000_000, 1);
    assert!(console.screen().pixels().all(|p| p == 0));

    console.clip(10, 10, 20, 20);
    console.reset_clip();
    assert_eq!(console.clip_rect(), ClipRect::FULL);

    config.set_level(LogCategory::Shape, LogLevel::Off);
    config.set_level(LogCategory::Blit, LogLevel::Off);
    config.set_level(LogCategory::Draw, LogLevel::Off);
}
