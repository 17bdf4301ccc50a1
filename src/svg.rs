//! Static SVG rendering of the alumni map

use crate::assets::Landmass;
use crate::config::{MapConfig, DEFAULT_ACCENT};
use crate::geo::ResolvedPoint;
use crate::projection::{FittedEquirectangular, VIEW_HEIGHT, VIEW_WIDTH};
use crate::viz::map::{pin_positions, PATTERN_OFFSET, PATTERN_STEP, PIN_RADIUS};
use crate::zoom::ZoomTransform;
use crossterm::style::Color;
use std::fmt::Write;

const OUTLINE_STROKE: &str = "#334155";
const OUTLINE_WIDTH: f64 = 1.2;
const DOT_FILL: &str = "#FFFFFF35";
const DOT_RADIUS: f64 = 1.6;

/// `#rrggbb` for an RGB color; named colors fall back to the default accent
pub fn color_hex(color: Color) -> String {
    let Color::Rgb { r, g, b } = color else {
        return color_hex(DEFAULT_ACCENT);
    };
    format!("#{r:02x}{g:02x}{b:02x}")
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn ring_path(projection: &FittedEquirectangular, ring: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, &(lng, lat)) in ring.iter().enumerate() {
        let (x, y) = projection.project(lng, lat);
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{x:.2},{y:.2}");
    }
    d.push('Z');
    d
}

/// Whole map as a standalone SVG document. Without `land` the outline and
/// dot fill are empty but every pin is still drawn.
pub fn render_svg(
    points: &[ResolvedPoint],
    land: Option<&Landmass>,
    config: &MapConfig,
    transform: ZoomTransform,
) -> String {
    let projection = land.map(|l| FittedEquirectangular::fit_size(l.bounds, VIEW_WIDTH, VIEW_HEIGHT));
    let paths: Vec<String> = match (land, &projection) {
        (Some(l), Some(p)) => l.rings.iter().map(|ring| ring_path(p, ring)).collect(),
        _ => Vec::new(),
    };
    let accent = color_hex(config.accent);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {VIEW_WIDTH} {VIEW_HEIGHT}" preserveAspectRatio="xMidYMid meet">"#
    );
    svg.push_str("  <defs>\n");
    let _ = writeln!(
        svg,
        r#"    <pattern id="dotPattern" width="{PATTERN_STEP}" height="{PATTERN_STEP}" patternUnits="userSpaceOnUse"><circle cx="{PATTERN_OFFSET}" cy="{PATTERN_OFFSET}" r="{DOT_RADIUS}" fill="{DOT_FILL}"/></pattern>"#
    );
    svg.push_str(
        r#"    <filter id="pinGlow" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur in="SourceGraphic" stdDeviation="2" result="blur"/><feMerge><feMergeNode in="blur"/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#,
    );
    svg.push('\n');
    svg.push_str("    <clipPath id=\"landClip\">\n");
    for d in &paths {
        let _ = writeln!(svg, r#"      <path d="{d}"/>"#);
    }
    svg.push_str("    </clipPath>\n  </defs>\n");

    let _ = writeln!(svg, r#"  <g transform="{}">"#, transform.to_svg());
    let _ = writeln!(
        svg,
        r#"    <g clip-path="url(#landClip)"><rect width="{VIEW_WIDTH}" height="{VIEW_HEIGHT}" fill="url(#dotPattern)"/></g>"#
    );
    let _ = writeln!(svg, r#"    <g fill="none" stroke="{OUTLINE_STROKE}" stroke-width="{OUTLINE_WIDTH}">"#);
    for d in &paths {
        let _ = writeln!(svg, r#"      <path d="{d}"/>"#);
    }
    svg.push_str("    </g>\n");

    let positions = pin_positions(points, config.pin_projection, projection.as_ref());
    for (point, (x, y)) in points.iter().zip(positions) {
        let _ = writeln!(
            svg,
            r#"    <g transform="translate({x:.2}, {y:.2})"><circle r="{PIN_RADIUS}" fill="{accent}" filter="url(#pinGlow)"/><title>{}</title></g>"#,
            escape_xml(&point.person.title_line())
        );
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}
