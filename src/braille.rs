//! Dot canvas packed into braille characters (2x4 dots per cell)

use crate::terminal::Terminal;
use crossterm::style::Color;

/// Dot layers, higher wins when several share a cell
pub const LAYER_GRID: u8 = 1;
pub const LAYER_LAND: u8 = 2;
pub const LAYER_OUTLINE: u8 = 3;
pub const LAYER_MARKER: u8 = 4;
pub const LAYER_HOVER: u8 = 5;

const DOT_BITS: [(usize, usize, u8); 8] = [
    (0, 0, 0x01),
    (1, 0, 0x02),
    (2, 0, 0x04),
    (0, 1, 0x08),
    (1, 1, 0x10),
    (2, 1, 0x20),
    (3, 0, 0x40),
    (3, 1, 0x80),
];

pub struct BrailleCanvas {
    width: usize,
    height: usize,
    dots: Vec<u8>,
}

impl BrailleCanvas {
    /// Canvas covering `cols x rows` terminal cells
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize * 2;
        let height = rows as usize * 4;
        Self {
            width,
            height,
            dots: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.dots.fill(0);
    }

    pub fn get(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.dots[y as usize * self.width + x as usize]
    }

    /// Set a dot, keeping the higher layer
    pub fn plot(&mut self, x: i64, y: i64, layer: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let cell = &mut self.dots[y as usize * self.width + x as usize];
        *cell = (*cell).max(layer);
    }

    pub fn plot_f(&mut self, x: f64, y: f64, layer: u8) {
        if x.is_finite() && y.is_finite() {
            self.plot(x.floor() as i64, y.floor() as i64, layer);
        }
    }

    /// Bresenham line, clipped to the canvas first
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, layer: u8) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let Some((x0, y0, x1, y1)) = clip_segment((x0, y0, x1, y1), self.width as f64, self.height as f64)
        else {
            return;
        };
        let (mut x, mut y) = (x0.floor() as i64, y0.floor() as i64);
        let (xe, ye) = (x1.floor() as i64, y1.floor() as i64);
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x, y, layer);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn disc(&mut self, cx: f64, cy: f64, radius: f64, layer: u8) {
        let r = radius.max(0.5);
        let ri = r.ceil() as i64;
        let (x0, y0) = (cx.floor() as i64, cy.floor() as i64);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f64) <= r * r {
                    self.plot(x0 + dx, y0 + dy, layer);
                }
            }
        }
    }

    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64, layer: u8) {
        let steps = ((radius * 8.0) as usize).clamp(16, 2048);
        for i in 0..steps {
            let t = i as f64 / steps as f64 * std::f64::consts::TAU;
            self.plot_f(cx + radius * t.cos(), cy + radius * t.sin(), layer);
        }
    }

    /// Pack dots into braille cells starting at terminal row `top`
    pub fn render(&self, term: &mut Terminal, top: u16, color_for: impl Fn(u8) -> (Color, bool)) {
        let rows = self.height / 4;
        let cols = self.width / 2;
        for cy in 0..rows {
            for cx in 0..cols {
                let mut bits: u8 = 0;
                let mut layer: u8 = 0;
                for &(dy, dx, bit) in &DOT_BITS {
                    let v = self.dots[(cy * 4 + dy) * self.width + cx * 2 + dx];
                    if v > 0 {
                        bits |= bit;
                        layer = layer.max(v);
                    }
                }
                if bits > 0 {
                    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                    let (color, bold) = color_for(layer);
                    term.set(cx as i32, top as i32 + cy as i32, ch, Some(color), bold);
                }
            }
        }
    }
}

/// Liang-Barsky clip of a segment to `[0, width) x [0, height)`
fn clip_segment(
    (x0, y0, x1, y1): (f64, f64, f64, f64),
    width: f64,
    height: f64,
) -> Option<(f64, f64, f64, f64)> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    // keep floor() of the far edge inside the canvas
    let (xmax, ymax) = (width - 1e-6, height - 1e-6);
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [(-dx, x0), (dx, xmax - x0), (-dy, y0), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy))
}
