//! Midpoint circles and ellipses.
//!
//! The boundary is traced in two passes, one stepping y while the slope is
//! shallow and one stepping x while it is steep, each plotting all four
//! quadrant reflections. Outlines write the traced points; fills record the
//! leftmost and rightmost traced column of every row in a [`SpanBuffer`]
//! and then fill those spans.

use crate::palette::map_color;
use crate::raster::Canvas;
use crate::{Console, HEIGHT, WIDTH};
use fc_core::logging::{log, LogCategory, LogLevel};

const ROWS: usize = HEIGHT as usize;

/// Largest radius [`trace`] accepts. Keeps the midpoint error terms, which
/// grow with `a * b * b`, well inside i64.
pub const MAX_RADIUS: i64 = 1 << 18;

/// Leftmost/rightmost touched column per screen row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanBuffer {
    left: [i32; ROWS],
    right: [i32; ROWS],
}

impl SpanBuffer {
    pub fn new() -> Self {
        Self {
            left: [WIDTH; ROWS],
            right: [-1; ROWS],
        }
    }

    pub fn reset(&mut self) {
        self.left.fill(WIDTH);
        self.right.fill(-1);
    }

    /// Rows off screen are ignored.
    pub fn touch(&mut self, x: i32, y: i32) {
        if !(0..HEIGHT).contains(&y) {
            return;
        }
        let row = y as usize;
        self.left[row] = self.left[row].min(x);
        self.right[row] = self.right[row].max(x);
    }

    /// Inclusive `(left, right)` of row `y`, if anything touched it.
    pub fn span(&self, y: i32) -> Option<(i32, i32)> {
        if !(0..HEIGHT).contains(&y) {
            return None;
        }
        let row = y as usize;
        (self.left[row] <= self.right[row]).then(|| (self.left[row], self.right[row]))
    }
}

impl Default for SpanBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trace the boundary of the ellipse centred at `(x0, y0)` with radii
/// `a` and `b`. Radii outside `1..=MAX_RADIUS` trace nothing, and points
/// that do not fit in i32 are skipped.
pub fn trace<F>(x0: i64, y0: i64, a: i64, b: i64, mut plot: F)
where
    F: FnMut(i32, i32),
{
    if !radii_traceable(a, b) {
        return;
    }

    let aa2 = a * a * 2;
    let bb2 = b * b * 2;
    let mut point = |x: i64, y: i64| {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            plot(x, y);
        }
    };
    let mut quadrants = |x: i64, y: i64| {
        point(x0 + x, y0 + y);
        point(x0 + x, y0 - y);
        point(x0 - x, y0 + y);
        point(x0 - x, y0 - y);
    };

    let (mut x, mut y) = (a, 0);
    let (mut dx, mut dy) = ((1 - 2 * a) * b * b, a * a);
    let (mut sx, mut sy) = (bb2 * a, 0);
    let mut e = 0;
    while sx >= sy {
        quadrants(x, y);
        y += 1;
        sy += aa2;
        e += dy;
        dy += aa2;
        if 2 * e + dx > 0 {
            x -= 1;
            sx -= bb2;
            e += dx;
            dx += bb2;
        }
    }

    let (mut x, mut y) = (0, b);
    let (mut dx, mut dy) = (b * b, (1 - 2 * b) * a * a);
    let (mut sx, mut sy) = (0, aa2 * b);
    let mut e = 0;
    while sy >= sx {
        quadrants(x, y);
        x += 1;
        sx += bb2;
        e += dx;
        dx += bb2;
        if 2 * e + dy > 0 {
            y -= 1;
            sy -= aa2;
            e += dy;
            dy += aa2;
        }
    }
}

fn radii_traceable(a: i64, b: i64) -> bool {
    (1..=MAX_RADIUS).contains(&a) && (1..=MAX_RADIUS).contains(&b)
}

impl Console {
    pub fn circ(&mut self, x: i32, y: i32, r: i32, color: u8) {
        self.fill_ellipse(x, y, r, r, color);
    }

    pub fn circb(&mut self, x: i32, y: i32, r: i32, color: u8) {
        self.outline_ellipse(x, y, r, r, color);
    }

    pub fn elli(&mut self, x: i32, y: i32, a: i32, b: i32, color: u8) {
        self.fill_ellipse(x, y, a, b, color);
    }

    pub fn ellib(&mut self, x: i32, y: i32, a: i32, b: i32, color: u8) {
        self.outline_ellipse(x, y, a, b, color);
    }

    fn outline_ellipse(&mut self, x: i32, y: i32, a: i32, b: i32, color: u8) {
        if !radii_traceable(a.into(), b.into()) {
            log(LogCategory::Shape, LogLevel::Trace, || {
                format!("ellipse outline with radii ({}, {}) skipped", a, b)
            });
            return;
        }
        let color = map_color(&self.ram.vram.mapping, color);
        let mut canvas = self.canvas();
        trace(x.into(), y.into(), a.into(), b.into(), |px, py| {
            canvas.set_pixel(px, py, color)
        });
    }

    fn fill_ellipse(&mut self, x: i32, y: i32, a: i32, b: i32, color: u8) {
        if !radii_traceable(a.into(), b.into()) {
            log(LogCategory::Shape, LogLevel::Trace, || {
                format!("ellipse with radii ({}, {}) skipped", a, b)
            });
            return;
        }
        let color = map_color(&self.ram.vram.mapping, color);

        let spans = &mut self.spans;
        spans.reset();
        trace(x.into(), y.into(), a.into(), b.into(), |px, py| spans.touch(px, py));

        let clip = self.clip;
        let mut canvas = Canvas::new(&mut self.ram.vram.screen, clip);
        let top = (i64::from(y) - i64::from(b)).max(clip.top.into()) as i32;
        let bottom = (i64::from(y) + i64::from(b) + 2).min(clip.bottom.into()) as i32;
        for row in top..bottom {
            if let Some((left, right)) = self.spans.span(row) {
                let xl = left.max(clip.left);
                let xr = right.saturating_add(1).min(clip.right);
                canvas.hline(xl, row, xr - xl, color);
            }
        }
    }
}
