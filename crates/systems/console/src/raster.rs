//! Pixel and span primitives.
//!
//! [`Canvas`] pairs the framebuffer with the clip rectangle for the length
//! of one drawing call. Every other component writes pixels through it.

use crate::memory::Screen;
use crate::palette::map_color;
use crate::{Console, HEIGHT, WIDTH};
use fc_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

/// Clip bounds; right and bottom are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub const FULL: ClipRect = ClipRect {
        left: 0,
        top: 0,
        right: WIDTH,
        bottom: HEIGHT,
    };

    /// Rectangle at `(x, y)` sized `w` x `h`, clamped to the screen.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        ClipRect {
            left: x.max(0),
            top: y.max(0),
            right: x.saturating_add(w).min(WIDTH),
            bottom: y.saturating_add(h).min(HEIGHT),
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && y >= self.top && x < self.right && y < self.bottom
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// True when the `w` x `h` box at `(x, y)` lies wholly outside.
    #[inline]
    pub fn rejects(&self, x: i32, y: i32, w: i32, h: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        y + i64::from(h) - 1 < i64::from(self.top)
            || x + i64::from(w) - 1 < i64::from(self.left)
            || y >= i64::from(self.bottom)
            || x >= i64::from(self.right)
    }
}

impl Default for ClipRect {
    fn default() -> Self {
        ClipRect::FULL
    }
}

pub struct Canvas<'a> {
    screen: &'a mut Screen,
    clip: ClipRect,
}

impl<'a> Canvas<'a> {
    pub fn new(screen: &'a mut Screen, clip: ClipRect) -> Self {
        Self { screen, clip }
    }

    pub fn clip(&self) -> ClipRect {
        self.clip
    }

    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.screen.get(x, y)
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u8) {
        if self.clip.contains(x, y) {
            self.screen.poke4((y * WIDTH + x) as usize, color);
        }
    }

    /// Caller must have proven `(x, y)` lies inside the clip rectangle.
    #[inline]
    pub(crate) fn set_pixel_fast(&mut self, x: i32, y: i32, color: u8) {
        debug_assert!(self.clip.contains(x, y), "unclipped write at ({}, {})", x, y);
        self.screen.poke4((y * WIDTH + x) as usize, color);
    }

    pub fn hline(&mut self, x: i32, y: i32, width: i32, color: u8) {
        if y < self.clip.top || y >= self.clip.bottom {
            return;
        }
        let xl = x.max(self.clip.left);
        let xr = x.saturating_add(width).min(self.clip.right);
        if xl >= xr {
            return;
        }
        let start = y * WIDTH;
        for i in (start + xl)..(start + xr) {
            self.screen.poke4(i as usize, color);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, height: i32, color: u8) {
        if x < self.clip.left || x >= self.clip.right {
            return;
        }
        let yt = y.max(self.clip.top);
        let yb = y.saturating_add(height).min(self.clip.bottom);
        for i in yt..yb {
            self.screen.poke4((i * WIDTH + x) as usize, color);
        }
    }

    pub fn rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u8) {
        let top = y.max(self.clip.top);
        let bottom = y.saturating_add(height).min(self.clip.bottom);
        for row in top..bottom {
            self.hline(x, row, width, color);
        }
    }

    pub fn rect_border(&mut self, x: i32, y: i32, width: i32, height: i32, color: u8) {
        self.hline(x, y, width, color);
        self.hline(x, y.saturating_add(height - 1), width, color);
        self.vline(x, y, height, color);
        self.vline(x.saturating_add(width - 1), y, height, color);
    }

    /// Stepped along the major axis; each step plots the truncated position.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u8) {
        let (mut x0, mut y0, mut x1, mut y1) = (x0, y0, x1, y1);
        let steep = (x0 - x1).abs() < (y0 - y1).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) {
            return;
        }

        let t = if x1 != x0 { (y1 - y0) / (x1 - x0) } else { 0.0 };

        // Skip steps that land before the clip rectangle on the major axis
        let (lo, hi) = if steep {
            (self.clip.top, self.clip.bottom)
        } else {
            (self.clip.left, self.clip.right)
        };
        let mut x = x0;
        if x < (lo - 1) as f32 {
            x += ((lo - 1) as f32 - x).floor();
        }
        let end = x1.min(hi as f32);

        while x <= end {
            let y = y0 + (x - x0) * t;
            if steep {
                self.set_pixel(y as i32, x as i32, color);
            } else {
                self.set_pixel(x as i32, y as i32, color);
            }
            x += 1.0;
        }
    }
}

impl Console {
    /// Canvas over the active screen with the current clip rectangle.
    pub(crate) fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(&mut self.ram.vram.screen, self.clip)
    }

    /// Set the clip rectangle, clamped to the screen.
    pub fn clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.clip = ClipRect::new(x, y, w, h);
        log(LogCategory::Draw, LogLevel::Debug, || format!("clip {:?}", self.clip));
    }

    pub fn reset_clip(&mut self) {
        self.clip = ClipRect::FULL;
        log(LogCategory::Draw, LogLevel::Debug, || "clip reset to full screen".to_string());
    }

    /// Colour index at `(x, y)`; 0 outside the screen.
    pub fn pix(&self, x: i32, y: i32) -> u8 {
        self.ram.vram.screen.get(x, y)
    }

    pub fn pix_set(&mut self, x: i32, y: i32, color: u8) {
        let color = map_color(&self.ram.vram.mapping, color);
        self.canvas().set_pixel(x, y, color);
    }

    pub fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u8) {
        let color = map_color(&self.ram.vram.mapping, color);
        self.canvas().rect(x, y, w, h, color);
    }

    pub fn rectb(&mut self, x: i32, y: i32, w: i32, h: i32, color: u8) {
        let color = map_color(&self.ram.vram.mapping, color);
        self.canvas().rect_border(x, y, w, h, color);
    }

    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u8) {
        let color = map_color(&self.ram.vram.mapping, color);
        self.canvas().line(x0, y0, x1, y1, color);
    }

    /// Clear the clip rectangle (the whole screen when unclipped).
    pub fn cls(&mut self, color: u8) {
        let color = map_color(&self.ram.vram.mapping, color);
        if self.clip == ClipRect::FULL {
            self.ram.vram.screen.fill(color);
        } else {
            let clip = self.clip;
            self.canvas()
                .rect(clip.left, clip.top, clip.right - clip.left, clip.bottom - clip.top, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(console: &Console, color: u8) -> usize {
        console.screen().pixels().filter(|&p| p == color).count()
    }

    #[test]
    fn test_clip_clamps_to_screen() {
        assert_eq!(
            ClipRect::new(-10, -5, 500, 500),
            ClipRect::FULL
        );
        let clip = ClipRect::new(10, 20, 30, 40);
        assert_eq!((clip.left, clip.top, clip.right, clip.bottom), (10, 20, 40, 60));
        assert!(ClipRect::new(10, 10, 0, 5).is_empty());
        assert!(ClipRect::new(i32::MAX - 1, 0, 100, 10).is_empty());
    }

    #[test]
    fn test_rejects_box_outside_clip() {
        let clip = ClipRect::new(10, 10, 10, 10);
        assert!(clip.rejects(0, 0, 10, 10));
        assert!(!clip.rejects(0, 0, 11, 11));
        assert!(clip.rejects(20, 10, 4, 4));
        assert!(!clip.rejects(19, 19, 4, 4));
    }

    #[test]
    fn test_rejects_near_coordinate_limits() {
        let clip = ClipRect::FULL;
        assert!(clip.rejects(0, i32::MAX - 4, 16, 16));
        assert!(clip.rejects(i32::MAX, 0, i32::MAX, 1));
        assert!(clip.rejects(i32::MIN, 0, i32::MAX, 10));
        assert!(!clip.rejects(-5, -5, i32::MAX, i32::MAX));
        assert!(clip.rejects(i32::MIN, i32::MIN, i32::MAX, i32::MAX));
    }

    #[test]
    fn test_rect_border_near_coordinate_limits() {
        let mut console = Console::new();
        console.rectb(0, i32::MAX - 1, 10, 10, 3);
        console.rectb(i32::MAX, 0, i32::MAX, 5, 3);
        console.rectb(i32::MIN, i32::MIN, 4, 4, 3);
        assert_eq!(count(&console, 3), 0);
    }

    #[test]
    fn test_set_pixel_respects_clip() {
        let mut console = Console::new();
        console.clip(5, 5, 2, 2);
        console.pix_set(4, 5, 1);
        console.pix_set(5, 5, 1);
        console.pix_set(6, 6, 1);
        console.pix_set(7, 6, 1);
        assert_eq!(count(&console, 1), 2);
        assert_eq!(console.pix(5, 5), 1);
        assert_eq!(console.pix(6, 6), 1);
    }

    #[test]
    fn test_rect_clipped_to_region() {
        let mut console = Console::new();
        console.clip(0, 0, 12, 12);
        console.rect(10, 10, 5, 5, 2);
        assert_eq!(count(&console, 2), 4);
        console.reset_clip();
        console.rect(-3, -3, 5, 5, 4);
        assert_eq!(count(&console, 4), 4);
    }

    #[test]
    fn test_rect_degenerate_sizes_draw_nothing() {
        let mut console = Console::new();
        console.rect(10, 10, 0, 5, 3);
        console.rect(10, 10, 5, -1, 3);
        console.rectb(10, 10, 0, 0, 3);
        assert_eq!(count(&console, 3), 0);
    }

    #[test]
    fn test_rect_border_outline_only() {
        let mut console = Console::new();
        console.rectb(10, 10, 4, 3, 6);
        assert_eq!(count(&console, 6), 10);
        assert_eq!(console.pix(10, 10), 6);
        assert_eq!(console.pix(13, 12), 6);
        assert_eq!(console.pix(11, 11), 0);
    }

    #[test]
    fn test_vline_clips_to_clip_rect() {
        let mut console = Console::new();
        console.clip(0, 5, 10, 5);
        console.canvas().vline(3, 0, 100, 8);
        assert_eq!(count(&console, 8), 5);
        assert_eq!(console.pix(3, 4), 0);
        assert_eq!(console.pix(3, 5), 8);
    }

    #[test]
    fn test_line_shallow_and_steep() {
        let mut console = Console::new();
        console.line(0.0, 0.0, 9.0, 0.0, 1);
        assert_eq!(count(&console, 1), 10);

        console.line(20.0, 0.0, 22.0, 9.0, 2);
        assert_eq!(count(&console, 2), 10);
        assert_eq!(console.pix(20, 0), 2);
        assert_eq!(console.pix(22, 9), 2);
    }

    #[test]
    fn test_zero_length_line_plots_one_point() {
        let mut console = Console::new();
        console.line(7.5, 3.2, 7.5, 3.2, 9);
        assert_eq!(count(&console, 9), 1);
        assert_eq!(console.pix(7, 3), 9);
    }

    #[test]
    fn test_huge_line_stays_bounded() {
        let mut console = Console::new();
        console.line(-1.0e9, 50.0, 1.0e9, 50.0, 5);
        assert_eq!(count(&console, 5), WIDTH as usize);
        console.line(f32::NAN, 0.0, 3.0, 3.0, 6);
        assert_eq!(count(&console, 6), 0);
    }

    #[test]
    fn test_colors_go_through_color_map() {
        let mut console = Console::new();
        console.color_map_mut().set(2, 11);
        console.rect(0, 0, 2, 2, 2);
        console.pix_set(5, 5, 0x12);
        assert_eq!(console.pix(0, 0), 11);
        assert_eq!(console.pix(5, 5), 11);
    }

    #[test]
    fn test_cls_full_and_clipped() {
        let mut console = Console::new();
        console.cls(7);
        assert_eq!(count(&console, 7), (WIDTH * HEIGHT) as usize);

        console.clip(0, 0, 10, 10);
        console.cls(1);
        assert_eq!(count(&console, 1), 100);
        assert_eq!(console.pix(10, 10), 7);
    }
}
