//! Alumni visualizations
//!
//! Each view resolves the roster on its own, owns its asset loader and draws
//! into the region below the navbar.

pub mod globe;
pub mod map;

use crate::braille::{LAYER_GRID, LAYER_HOVER, LAYER_LAND, LAYER_MARKER, LAYER_OUTLINE};
use crate::geo::ResolvedPoint;
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers, MouseEvent};
use crossterm::style::Color;
use image::RgbaImage;

/// Terminal rows a view may draw into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub top: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Area {
    /// Center of a terminal cell in canvas dot coordinates
    pub fn cell_to_dot(&self, col: u16, row: u16) -> Option<(f64, f64)> {
        if row < self.top || row >= self.top + self.rows || col >= self.cols {
            return None;
        }
        Some((col as f64 * 2.0 + 1.0, (row - self.top) as f64 * 4.0 + 2.0))
    }

    /// Terminal cell holding a canvas dot
    pub fn dot_to_cell(&self, x: f64, y: f64) -> (i32, i32) {
        ((x / 2.0).floor() as i32, self.top as i32 + (y / 4.0).floor() as i32)
    }
}

pub trait AlumniView {
    fn name(&self) -> &'static str;

    /// Points this view is drawing, in roster order
    fn points(&self) -> &[ResolvedPoint];

    /// Check background loads; returns true if anything changed
    fn poll_assets(&mut self) -> bool;

    /// Handle a key; returns true if it was consumed
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool;

    /// Handle a mouse event inside `area`
    fn handle_mouse(&mut self, event: &MouseEvent, area: Area);

    fn render(&mut self, term: &mut Terminal, area: Area);

    /// One-line text for the status bar
    fn status(&self) -> String;

    fn help(&self) -> &'static str;
}

/// Color for a canvas layer
pub fn layer_color(layer: u8, accent: Color) -> (Color, bool) {
    match layer {
        LAYER_GRID => (Color::DarkGrey, false),
        LAYER_LAND => (Color::DarkGrey, false),
        LAYER_OUTLINE => (Color::Grey, false),
        LAYER_MARKER => (accent, false),
        LAYER_HOVER => (accent, true),
        _ => (Color::White, false),
    }
}

/// Next index when cycling through `len` markers with the keyboard
pub fn cycle_index(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

/// Tooltip lines for a person
pub fn tooltip_lines(point: &ResolvedPoint) -> Vec<String> {
    let p = &point.person;
    let mut lines = vec![p.name.clone()];
    if let Some(role) = &p.role {
        lines.push(role.clone());
    }
    lines.push(p.location.clone());
    if let Some(link) = &p.profile {
        lines.push(link.clone());
    }
    lines
}

/// Alpha below which a portrait pixel is left blank
const ALPHA_THRESHOLD: u8 = 10;

/// Draw an image with half blocks, two pixel rows per cell, top-left at `(x, y)`
pub fn render_halfblock(term: &mut Terminal, rgba: &RgbaImage, x: i32, y: i32) {
    let rgb = |px: [u8; 4]| Color::Rgb { r: px[0], g: px[1], b: px[2] };
    for cy in 0..rgba.height().div_ceil(2) {
        let top_row = cy * 2;
        let bot_row = top_row + 1;
        for cx in 0..rgba.width() {
            let top = rgba.get_pixel(cx, top_row).0;
            let bot = if bot_row < rgba.height() { rgba.get_pixel(cx, bot_row).0 } else { [0; 4] };
            let (tx, ty) = (x + cx as i32, y + cy as i32);
            match (top[3] >= ALPHA_THRESHOLD, bot[3] >= ALPHA_THRESHOLD) {
                (false, false) => term.set(tx, ty, ' ', None, false),
                (false, true) => term.set(tx, ty, '▄', Some(rgb(bot)), false),
                (true, false) => term.set(tx, ty, '▀', Some(rgb(top)), false),
                (true, true) => term.set_with_bg(tx, ty, '▀', Some(rgb(top)), Some(rgb(bot)), false),
            }
        }
    }
}

/// Boxed tooltip next to the cell `(x, y)`, kept inside `area`.
/// A portrait, when given, sits left of the text.
pub fn render_tooltip(
    term: &mut Terminal,
    area: Area,
    x: i32,
    y: i32,
    lines: &[String],
    avatar: Option<&RgbaImage>,
    accent: Color,
) {
    if lines.is_empty() {
        return;
    }
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let (art_w, art_h) = avatar.map_or((0, 0), |img| (img.width() as i32, img.height().div_ceil(2) as i32));
    // portrait columns plus a gap
    let text_x = if art_w > 0 { art_w + 2 } else { 0 };
    let rows = (lines.len() as i32).max(art_h);
    let box_w = inner as i32 + 4 + text_x;
    let box_h = rows + 2;

    let left_edge = 0;
    let right_edge = area.cols as i32;
    let top_edge = area.top as i32;
    let bottom_edge = (area.top + area.rows) as i32;

    // prefer right of and above the marker, flip when it would not fit
    let mut bx = x + 2;
    if bx + box_w > right_edge {
        bx = (x - 2 - box_w).max(left_edge);
    }
    let mut by = y - box_h;
    if by < top_edge {
        by = (y + 1).min(bottom_edge - box_h).max(top_edge);
    }

    let border = Some(Color::DarkGrey);
    term.set(bx, by, '┌', border, false);
    term.set(bx + box_w - 1, by, '┐', border, false);
    term.set(bx, by + box_h - 1, '└', border, false);
    term.set(bx + box_w - 1, by + box_h - 1, '┘', border, false);
    for cx in bx + 1..bx + box_w - 1 {
        term.set(cx, by, '─', border, false);
        term.set(cx, by + box_h - 1, '─', border, false);
    }
    let blank = " ".repeat((box_w - 2) as usize);
    for row in 0..rows {
        let ry = by + 1 + row;
        term.set(bx, ry, '│', border, false);
        term.set(bx + box_w - 1, ry, '│', border, false);
        term.set_str(bx + 1, ry, &blank, None, false);
    }

    if let Some(img) = avatar {
        render_halfblock(term, img, bx + 2, by + 1);
    }

    for (i, line) in lines.iter().enumerate() {
        let ry = by + 1 + i as i32;
        let padded = format!(" {:<width$} ", line, width = inner);
        let (color, bold) = match i {
            0 => (accent, true),
            _ if line.starts_with("http") => (Color::Blue, false),
            _ => (Color::Grey, false),
        };
        term.set_str(bx + 1 + text_x, ry, &padded, Some(color), bold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoCoordinate, PersonRecord};

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle_index(None, 3, true), Some(0));
        assert_eq!(cycle_index(None, 3, false), Some(2));
        assert_eq!(cycle_index(Some(2), 3, true), Some(0));
        assert_eq!(cycle_index(Some(0), 3, false), Some(2));
        assert_eq!(cycle_index(Some(0), 0, true), None);
    }

    #[test]
    fn area_cell_mapping() {
        let area = Area { top: 1, cols: 10, rows: 5 };
        assert_eq!(area.cell_to_dot(0, 0), None);
        assert_eq!(area.cell_to_dot(3, 1), Some((7.0, 2.0)));
        assert_eq!(area.cell_to_dot(10, 2), None);
        assert_eq!(area.dot_to_cell(7.0, 2.0), (3, 1));
    }

    #[test]
    fn tooltip_has_optional_lines() {
        let mut person = PersonRecord::new("Jane", "Pune, India");
        let point = ResolvedPoint { person: person.clone(), coord: GeoCoordinate::new(18.5, 73.8) };
        assert_eq!(tooltip_lines(&point), vec!["Jane", "Pune, India"]);
        person.role = Some("Captain".into());
        person.profile = Some("https://example.com/jane".into());
        let point = ResolvedPoint { person, coord: GeoCoordinate::new(18.5, 73.8) };
        assert_eq!(tooltip_lines(&point).len(), 4);
    }

    #[test]
    fn tooltip_stays_on_screen() {
        let area = Area { top: 1, cols: 20, rows: 8 };
        let mut term = Terminal::with_size(20, 9);
        let lines = vec!["Jane".to_string(), "Pune".to_string()];
        render_tooltip(&mut term, area, 19, 1, &lines, None, Color::Red);
        let text: String = (0..9).map(|y| term.row_text(y)).collect::<Vec<_>>().join("\n");
        assert!(text.contains("Jane"));
        assert!(text.contains("Pune"));
        assert!(!term.row_text(0).contains('┌'));
    }

    #[test]
    fn halfblock_packs_two_rows_per_cell() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 1, image::Rgba([0, 255, 0, 255]));
        let mut term = Terminal::with_size(4, 2);
        render_halfblock(&mut term, &img, 1, 0);

        let both = term.get(1, 0).unwrap();
        assert_eq!(both.ch, '▀');
        assert_eq!(both.fg, Some(Color::Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(both.bg, Some(Color::Rgb { r: 0, g: 0, b: 255 }));
        let bottom_only = term.get(2, 0).unwrap();
        assert_eq!(bottom_only.ch, '▄');
        assert_eq!(bottom_only.bg, None);
        assert_eq!(term.row_text(1), "    ");
    }

    #[test]
    fn tooltip_makes_room_for_avatar() {
        let area = Area { top: 0, cols: 40, rows: 12 };
        let mut term = Terminal::with_size(40, 12);
        let lines = vec!["Jane".to_string(), "Pune".to_string()];
        let avatar = RgbaImage::from_pixel(8, 8, image::Rgba([90, 90, 90, 255]));
        render_tooltip(&mut term, area, 0, 11, &lines, Some(&avatar), Color::Red);

        // 8-column portrait, a gap, then " Jane "; four rows tall for the portrait
        let top = (0..12).find(|&y| term.row_text(y).contains('┌')).unwrap();
        let first = term.row_text(top + 1);
        assert_eq!(first.chars().filter(|&c| c == '▀').count(), 8);
        assert!(first.contains("▀  Jane"));
        assert!(term.row_text(top + 4).contains('▀'));
        assert!(term.row_text(top + 5).contains('└'));
    }
}
