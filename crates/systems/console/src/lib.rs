//! Immediate-mode software rasterizer for a 240x136, 16-colour fantasy
//! console.
//!
//! [`Console`] owns the console RAM and the per-frame drawing context (clip
//! rectangle, span buffer, inactive vbank). Every drawing call runs to
//! completion, mutates the packed framebuffer in place and never fails:
//! invalid geometry degrades to drawing nothing.
//!
//! ```
//! use fc_console::{Console, SpriteParams};
//!
//! let mut console = Console::new();
//! console.cls(0);
//! console.rect(10, 10, 5, 5, 2);
//! console.spr(1, 40, 40, SpriteParams { colorkey: &[0], ..Default::default() });
//! assert_eq!(console.pix(12, 12), 2);
//! ```

pub mod blit;
pub mod ellipse;
pub mod map;
pub mod memory;
pub mod orientation;
pub mod palette;
pub mod raster;
pub mod text;
pub mod tilesheet;
pub mod triangle;

pub use blit::SpriteParams;
pub use map::{MapParams, Remap, RemapResult};
pub use memory::{MemoryError, Ram};
pub use orientation::{Flip, Orientation, Rotate};
pub use palette::{Mapping, TRANSPARENT};
pub use raster::ClipRect;
pub use text::{FontParams, PrintParams};
pub use tilesheet::BlitSegment;
pub use triangle::{TexVertex, TextureSource};

use ellipse::SpanBuffer;
use fc_core::logging::{log, LogCategory, LogLevel};
use fc_core::ppu::palette::IndexedPalette;
use fc_core::types::Frame;
use memory::{ColorMap, Screen, Vram};
use serde::{Deserialize, Serialize};

pub const WIDTH: i32 = 240;
pub const HEIGHT: i32 = 136;
pub const TILE_SIZE: i32 = 8;
pub const MAP_WIDTH: i32 = 240;
pub const MAP_HEIGHT: i32 = 136;
pub const FLAGS: usize = 512;
pub const FONT_CHARS: usize = 256;

#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("malformed console state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("screen data is not valid hex")]
    BadHex,
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Serialized drawing context for tooling and headless dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Snapshot {
    clip: ClipRect,
    segment: BlitSegment,
    mapping: [u8; 8],
    vbank: u8,
    screen: String,
}

/// Console RAM plus the drawing context that outlives single calls.
#[derive(Debug, Clone)]
pub struct Console {
    pub ram: Ram,
    clip: ClipRect,
    spans: SpanBuffer,
    /// The vbank not currently drawn to
    bank: Vram,
    bank_id: u8,
}

impl Console {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(),
            clip: ClipRect::FULL,
            spans: SpanBuffer::new(),
            bank: Vram::new(),
            bank_id: 0,
        }
    }

    pub fn clip_rect(&self) -> ClipRect {
        self.clip
    }

    pub fn screen(&self) -> &Screen {
        &self.ram.vram.screen
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.ram.vram.mapping
    }

    pub fn color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.ram.vram.mapping
    }

    pub fn segment(&self) -> BlitSegment {
        self.ram.vram.segment
    }

    pub fn set_segment(&mut self, segment: BlitSegment) {
        log(LogCategory::Memory, LogLevel::Debug, || {
            format!("blit segment {} -> {}", self.ram.vram.segment.value(), segment.value())
        });
        self.ram.vram.segment = segment;
    }

    /// Per-call mapping: the global colour map with `keys` transparent.
    pub(crate) fn mapping(&self, keys: &[u8]) -> Mapping {
        Mapping::new(&self.ram.vram.mapping, keys)
    }

    pub fn vbank_id(&self) -> u8 {
        self.bank_id
    }

    /// Select the active video bank (0 or 1) and return the previous one.
    ///
    /// Switching swaps the whole video state (screen, palette, colour map,
    /// segment); the inactive screen stays readable through
    /// [`TextureSource::VBank`].
    pub fn vbank(&mut self, id: u8) -> u8 {
        let previous = self.bank_id;
        let id = id & 1;
        if id != previous {
            std::mem::swap(&mut self.ram.vram, &mut self.bank);
            self.bank_id = id;
            log(LogCategory::Memory, LogLevel::Debug, || format!("vbank {} -> {}", previous, id));
        }
        previous
    }

    /// Screen of the vbank not currently drawn to.
    pub fn inactive_screen(&self) -> &Screen {
        &self.bank.screen
    }

    /// Resolve the active screen through its display palette.
    pub fn frame(&self) -> Frame {
        let palette = self.ram.vram.display_palette();
        let mut frame = Frame::new(WIDTH as u32, HEIGHT as u32);
        for (out, index) in frame.pixels.iter_mut().zip(self.ram.vram.screen.pixels()) {
            *out = palette.get_color(index as usize);
        }
        frame
    }

    /// Drawing context and active screen as JSON.
    pub fn snapshot(&self) -> serde_json::Value {
        let snapshot = Snapshot {
            clip: self.clip,
            segment: self.ram.vram.segment,
            mapping: self.ram.vram.mapping.bytes(),
            vbank: self.bank_id,
            screen: to_hex(self.ram.vram.screen.bytes()),
        };
        serde_json::json!(snapshot)
    }

    /// Inverse of [`Console::snapshot`]. Nothing changes unless the whole
    /// state parses.
    pub fn restore(&mut self, value: &serde_json::Value) -> Result<(), StateError> {
        let snapshot: Snapshot = serde_json::from_value(value.clone())?;
        let screen = from_hex(&snapshot.screen).ok_or(StateError::BadHex)?;
        let mut restored = Screen::new();
        restored.load(&screen)?;

        self.vbank(snapshot.vbank);
        self.ram.vram.screen = restored;
        self.ram.vram.mapping = ColorMap::from_bytes(snapshot.mapping);
        self.ram.vram.segment = snapshot.segment;
        self.clip = ClipRect::new(
            snapshot.clip.left,
            snapshot.clip.top,
            snapshot.clip.right - snapshot.clip.left,
            snapshot.clip.bottom - snapshot.clip.top,
        );
        log(LogCategory::Memory, LogLevel::Debug, || {
            format!("restored state: clip {:?}, vbank {}", self.clip, self.bank_id)
        });
        Ok(())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_console_defaults() {
        let console = Console::new();
        assert_eq!(console.clip_rect(), ClipRect::FULL);
        assert_eq!(console.segment(), BlitSegment::TILES);
        assert_eq!(console.vbank_id(), 0);
        assert!(console.screen().pixels().all(|p| p == 0));
    }

    #[test]
    fn test_frame_uses_display_palette() {
        let mut console = Console::new();
        console.cls(3);
        let frame = console.frame();
        assert_eq!((frame.width, frame.height), (240, 136));
        assert_eq!(frame.pixels[0], 0xFFEF7D57);
        assert!(frame.pixels.iter().all(|&p| p == 0xFFEF7D57));
    }

    #[test]
    fn test_vbank_swaps_video_state() {
        let mut console = Console::new();
        console.cls(5);
        assert_eq!(console.vbank(1), 0);
        assert_eq!(console.pix(0, 0), 0);
        assert_eq!(console.inactive_screen().get(0, 0), 5);

        console.cls(9);
        assert_eq!(console.vbank(3), 1); // masked to bank 1, no change
        assert_eq!(console.vbank(0), 1);
        assert_eq!(console.pix(0, 0), 5);
        assert_eq!(console.inactive_screen().get(0, 0), 9);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut console = Console::new();
        console.clip(4, 4, 20, 10);
        console.color_map_mut().set(1, 7);
        console.set_segment(BlitSegment::SPRITES);
        console.pix_set(5, 5, 1);
        let state = console.snapshot();

        let mut other = Console::new();
        other.restore(&state).unwrap();
        assert_eq!(other.clip_rect(), console.clip_rect());
        assert_eq!(other.segment(), BlitSegment::SPRITES);
        assert_eq!(other.color_map().get(1), 7);
        assert_eq!(other.pix(5, 5), 7);
        assert_eq!(other.snapshot(), state);
    }

    #[test]
    fn test_restore_rejects_bad_state() {
        let mut console = Console::new();
        console.pix_set(0, 0, 4);

        let err = console.restore(&serde_json::json!({ "clip": 3 })).unwrap_err();
        assert!(matches!(err, StateError::Json(_)));

        let mut state = console.snapshot();
        state["screen"] = serde_json::json!("zz");
        assert!(matches!(console.restore(&state), Err(StateError::BadHex)));
        assert_eq!(console.pix(0, 0), 4);
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(to_hex(&[0x00, 0xAB, 0x1F]), "00ab1f");
        assert_eq!(from_hex("00ab1f"), Some(vec![0x00, 0xAB, 0x1F]));
        assert_eq!(from_hex("abc"), None);
    }
}
