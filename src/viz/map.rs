//! Flat world map with a pin per alumnus

use super::{cycle_index, layer_color, AlumniView, Area};
use crate::assets::{point_in_rings, AssetLoader, LoadState, Landmass};
use crate::braille::{BrailleCanvas, LAYER_HOVER, LAYER_LAND, LAYER_MARKER, LAYER_OUTLINE};
use crate::config::{MapConfig, PinProjection};
use crate::geo::{PersonRecord, ResolvedPoint};
use crate::hover::{hit_test, Hover, PointerTracker};
use crate::projection::{linear_project, FittedEquirectangular, VIEW_HEIGHT, VIEW_WIDTH};
use crate::resolver::LocationResolver;
use crate::terminal::Terminal;
use crate::zoom::{ZoomController, ZoomTransform};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Land dot pattern spacing and offset, in view box units
pub const PATTERN_STEP: f64 = 9.2;
pub const PATTERN_OFFSET: f64 = 2.2;

/// Pin radius in view box units
pub const PIN_RADIUS: f64 = 6.0;

const KEY_PAN: f64 = 60.0;
const KEY_ZOOM: f64 = 1.25;
const WHEEL_ZOOM: f64 = 1.15;

const HELP: &str = "\
MAP
─────────────────
arrows/hjkl Pan
drag        Pan
+/- wheel   Zoom
0           Reset
Tab         Next alumnus
Esc         Clear hover";

/// Landmass projected into view box space, ready to draw
pub struct ProjectedLand {
    pub projection: FittedEquirectangular,
    pub rings: Vec<Vec<(f64, f64)>>,
    /// Pattern dots that fall on land
    pub dots: Vec<(f64, f64)>,
}

impl ProjectedLand {
    pub fn new(land: &Landmass) -> Self {
        let projection = FittedEquirectangular::fit_size(land.bounds, VIEW_WIDTH, VIEW_HEIGHT);
        let rings: Vec<Vec<(f64, f64)>> = land
            .rings
            .iter()
            .map(|ring| ring.iter().map(|&(lng, lat)| projection.project(lng, lat)).collect())
            .collect();

        let boxes: Vec<(f64, f64, f64, f64)> = rings
            .iter()
            .map(|ring| {
                ring.iter().fold(
                    (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                    |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                )
            })
            .collect();

        let mut dots = Vec::new();
        let mut y = PATTERN_OFFSET;
        while y < VIEW_HEIGHT {
            let mut x = PATTERN_OFFSET;
            while x < VIEW_WIDTH {
                let candidates = rings
                    .iter()
                    .zip(&boxes)
                    .filter(|(_, b)| x >= b.0 && x <= b.2 && y >= b.1 && y <= b.3)
                    .map(|(ring, _)| ring.as_slice());
                if point_in_rings(candidates, x, y) {
                    dots.push((x, y));
                }
                x += PATTERN_STEP;
            }
            y += PATTERN_STEP;
        }

        Self { projection, rings, dots }
    }
}

/// Pin positions in view box space, one per point, no deduplication
pub fn pin_positions(
    points: &[ResolvedPoint],
    mode: PinProjection,
    outline: Option<&FittedEquirectangular>,
) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| match (mode, outline) {
            (PinProjection::Fitted, Some(projection)) => projection.project_coord(p.coord),
            _ => linear_project(p.coord, VIEW_WIDTH, VIEW_HEIGHT),
        })
        .collect()
}

/// View box fitted into the canvas, centered ("meet")
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub ox: f64,
    pub oy: f64,
}

impl Viewport {
    pub fn fit(width: usize, height: usize) -> Self {
        let scale = (width as f64 / VIEW_WIDTH).min(height as f64 / VIEW_HEIGHT);
        Self {
            scale,
            ox: (width as f64 - VIEW_WIDTH * scale) / 2.0,
            oy: (height as f64 - VIEW_HEIGHT * scale) / 2.0,
        }
    }

    /// Zoomed view box point to canvas dots
    pub fn to_canvas(&self, t: &ZoomTransform, p: (f64, f64)) -> (f64, f64) {
        let (x, y) = t.apply(p);
        (x * self.scale + self.ox, y * self.scale + self.oy)
    }

    /// Canvas dots to the (post-zoom) view box space the zoom anchors in
    pub fn to_view_box(&self, (x, y): (f64, f64)) -> (f64, f64) {
        ((x - self.ox) / self.scale, (y - self.oy) / self.scale)
    }
}

pub struct MapView {
    points: Vec<ResolvedPoint>,
    pins: Vec<(f64, f64)>,
    hover: Hover,
    tracker: PointerTracker,
    zoom: ZoomController,
    config: MapConfig,
    land: AssetLoader<Landmass>,
    projected: Option<ProjectedLand>,
    canvas: BrailleCanvas,
    viewport: Viewport,
    drag_from: Option<(u16, u16)>,
}

impl MapView {
    pub fn new(people: &[PersonRecord], resolver: &LocationResolver, config: MapConfig) -> Self {
        let source = config.landmass.clone();
        let land = AssetLoader::spawn("landmass", move || Landmass::load(&source));
        Self::with_loader(people, resolver, config, land)
    }

    pub fn with_loader(
        people: &[PersonRecord],
        resolver: &LocationResolver,
        config: MapConfig,
        land: AssetLoader<Landmass>,
    ) -> Self {
        let mut view = Self {
            points: Vec::new(),
            pins: Vec::new(),
            hover: Hover::None,
            tracker: PointerTracker::default(),
            zoom: ZoomController::new(config.min_zoom, config.max_zoom),
            config,
            land,
            projected: None,
            canvas: BrailleCanvas::new(0, 0),
            viewport: Viewport::fit(0, 0),
            drag_from: None,
        };
        view.accept_land();
        view.set_people(people, resolver);
        view
    }

    pub fn set_people(&mut self, people: &[PersonRecord], resolver: &LocationResolver) {
        self.points = resolver.resolve_all(people);
        self.hover.clear();
        self.tracker.reset();
        self.place_pins();
        tracing::debug!(pins = self.pins.len(), "map pins rebuilt");
    }

    fn place_pins(&mut self) {
        let outline = self.projected.as_ref().map(|p| &p.projection);
        self.pins = pin_positions(&self.points, self.config.pin_projection, outline);
    }

    fn accept_land(&mut self) {
        if let LoadState::Ready(land) = self.land.state() {
            self.projected = Some(ProjectedLand::new(land));
        }
    }

    #[cfg(test)]
    pub fn pins(&self) -> &[(f64, f64)] {
        &self.pins
    }

    #[cfg(test)]
    pub fn hover(&self) -> Hover {
        self.hover
    }

    #[cfg(test)]
    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    #[cfg(test)]
    pub fn projected_land(&self) -> Option<&ProjectedLand> {
        self.projected.as_ref()
    }

    #[cfg(test)]
    pub fn pointer_enter(&mut self, index: usize) {
        if index < self.points.len() {
            self.hover.enter(index);
        }
    }

    #[cfg(test)]
    pub fn pointer_leave(&mut self, index: usize) {
        self.hover.leave(index);
    }

    #[cfg(test)]
    /// Apply a zoom gesture requesting scale `k` about a view box point
    pub fn zoom_gesture(&mut self, k: f64, anchor: (f64, f64)) {
        self.zoom.zoom_to(k, anchor);
    }

    fn center(&self) -> (f64, f64) {
        (VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0)
    }

    /// Pin under canvas dot `(x, y)`, topmost (last drawn) first on ties
    pub fn pin_at(&self, x: f64, y: f64) -> Option<usize> {
        let t = self.zoom.transform();
        let radius = (PIN_RADIUS * t.k * self.viewport.scale).max(1.0) + 1.5;
        let targets = self.pins.iter().enumerate().rev().map(|(i, &p)| {
            let (cx, cy) = self.viewport.to_canvas(&t, p);
            (i, cx, cy)
        });
        hit_test(targets, x, y, radius)
    }
}

impl AlumniView for MapView {
    fn name(&self) -> &'static str {
        "map"
    }

    fn points(&self) -> &[ResolvedPoint] {
        &self.points
    }

    fn poll_assets(&mut self) -> bool {
        if !self.land.poll() {
            return false;
        }
        self.accept_land();
        if self.config.pin_projection == PinProjection::Fitted {
            self.place_pins();
        }
        true
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let step = KEY_PAN;
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.zoom.pan(step, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.zoom.pan(-step, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.zoom.pan(0.0, step),
            KeyCode::Down | KeyCode::Char('j') => self.zoom.pan(0.0, -step),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom.zoom_by(KEY_ZOOM, self.center()),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom.zoom_by(1.0 / KEY_ZOOM, self.center()),
            KeyCode::Char('0') => self.zoom.reset(),
            KeyCode::Tab | KeyCode::BackTab => {
                let forward = code == KeyCode::Tab && !modifiers.contains(KeyModifiers::SHIFT);
                if let Some(next) = cycle_index(self.hover.index(), self.points.len(), forward) {
                    self.hover.enter(next);
                }
            }
            KeyCode::Esc => self.hover.clear(),
            _ => return false,
        }
        true
    }

    fn handle_mouse(&mut self, event: &MouseEvent, area: Area) {
        let dot = area.cell_to_dot(event.column, event.row);
        match event.kind {
            MouseEventKind::Moved => {
                let hit = dot.and_then(|(x, y)| self.pin_at(x, y));
                self.tracker.update(hit, &mut self.hover);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((event.column, event.row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((c0, r0)) = self.drag_from {
                    let s = self.viewport.scale.max(f64::EPSILON);
                    let dx = (event.column as f64 - c0 as f64) * 2.0 / s;
                    let dy = (event.row as f64 - r0 as f64) * 4.0 / s;
                    self.zoom.pan(dx, dy);
                }
                self.drag_from = Some((event.column, event.row));
            }
            MouseEventKind::Up(_) => self.drag_from = None,
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let factor = if event.kind == MouseEventKind::ScrollUp { WHEEL_ZOOM } else { 1.0 / WHEEL_ZOOM };
                let anchor = dot.map(|d| self.viewport.to_view_box(d)).unwrap_or_else(|| self.center());
                self.zoom.zoom_by(factor, anchor);
            }
            _ => {}
        }
    }

    fn render(&mut self, term: &mut Terminal, area: Area) {
        if self.canvas.width() != area.cols as usize * 2 || self.canvas.height() != area.rows as usize * 4 {
            self.canvas = BrailleCanvas::new(area.cols, area.rows);
            self.viewport = Viewport::fit(self.canvas.width(), self.canvas.height());
        }
        self.canvas.clear();
        let t = self.zoom.transform();
        let vp = self.viewport;

        if let Some(land) = &self.projected {
            for &dot in &land.dots {
                let (x, y) = vp.to_canvas(&t, dot);
                self.canvas.plot_f(x, y, LAYER_LAND);
            }
            for ring in &land.rings {
                for pair in ring.windows(2) {
                    let (x0, y0) = vp.to_canvas(&t, pair[0]);
                    let (x1, y1) = vp.to_canvas(&t, pair[1]);
                    self.canvas.line(x0, y0, x1, y1, LAYER_OUTLINE);
                }
            }
        }

        let hovered = self.hover.index();
        let r = (PIN_RADIUS * t.k * vp.scale).max(1.0);
        for (i, &pin) in self.pins.iter().enumerate() {
            let (x, y) = vp.to_canvas(&t, pin);
            let layer = if Some(i) == hovered { LAYER_HOVER } else { LAYER_MARKER };
            self.canvas.disc(x, y, r, layer);
        }

        let accent = self.config.accent;
        self.canvas.render(term, area.top, |layer| layer_color(layer, accent));
    }

    /// Native-title style: the hovered pin's one-line title, or a summary
    fn status(&self) -> String {
        if let Some(i) = self.hover.index() {
            return self.points[i].person.title_line();
        }
        let outline = match self.land.state() {
            LoadState::Loading => "loading outline",
            LoadState::Ready(_) => "outline",
            LoadState::Failed => "no outline",
        };
        format!(
            "{} alumni on the map · {} · zoom {:.1}x",
            self.points.len(),
            outline,
            self.zoom.transform().k
        )
    }

    fn help(&self) -> &'static str {
        HELP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetSource;
    use crate::error::AtlasError;
    use crate::geo::GeoCoordinate;

    fn loaded() -> AssetLoader<Landmass> {
        AssetLoader::settled("landmass", LoadState::Ready(Landmass::load(&AssetSource::Bundled).unwrap()))
    }

    fn failed() -> AssetLoader<Landmass> {
        AssetLoader::settled("landmass", LoadState::Failed)
    }

    fn map(people: &[PersonRecord], land: AssetLoader<Landmass>) -> MapView {
        MapView::with_loader(people, &LocationResolver::default(), MapConfig::default(), land)
    }

    #[test]
    fn pune_pin_uses_linear_formula() {
        let m = map(&[PersonRecord::new("Jane", "Pune, India")], loaded());
        assert_eq!(m.pins().len(), 1);
        let (x, y) = m.pins()[0];
        assert!((x - (73.8567 + 180.0) / 360.0 * 2200.0).abs() < 1e-9);
        assert!((y - (90.0 - 18.5204) / 180.0 * 1000.0).abs() < 1e-9);
    }

    #[test]
    fn identical_locations_give_two_pins() {
        let people = vec![
            PersonRecord::new("A", "Mumbai"),
            PersonRecord::new("B", "Mumbai"),
            PersonRecord::new("C", "Atlantis"),
        ];
        let m = map(&people, loaded());
        assert_eq!(m.pins().len(), 2);
        assert_eq!(m.pins()[0], m.pins()[1]);
    }

    #[test]
    fn pins_render_without_landmass() {
        let mut m = map(&[PersonRecord::new("Jane", "Seattle")], failed());
        assert!(m.projected_land().is_none());
        assert_eq!(m.pins().len(), 1);
        let area = Area { top: 0, cols: 44, rows: 10 };
        let mut term = Terminal::with_size(44, 10);
        m.render(&mut term, area);
        let drawn = (0..10).any(|y| term.row_text(y).chars().any(|c| c != ' '));
        assert!(drawn);
        assert!(m.status().contains("no outline"));
    }

    #[test]
    fn fitted_mode_follows_outline_when_loaded() {
        let config = MapConfig { pin_projection: PinProjection::Fitted, ..MapConfig::default() };
        let people = vec![PersonRecord::new("Jane", "Pune, India")];
        let m = MapView::with_loader(&people, &LocationResolver::default(), config.clone(), loaded());
        let projection = m.projected_land().unwrap().projection;
        assert_eq!(m.pins()[0], projection.project_coord(GeoCoordinate::new(18.5204, 73.8567)));

        // without the outline it falls back to the linear formula
        let m = MapView::with_loader(&people, &LocationResolver::default(), config, failed());
        assert_eq!(m.pins()[0], linear_project(GeoCoordinate::new(18.5204, 73.8567), VIEW_WIDTH, VIEW_HEIGHT));
    }

    #[test]
    fn zoom_gesture_is_clamped() {
        let mut m = map(&[], failed());
        assert_eq!(m.transform(), ZoomTransform::IDENTITY);
        m.zoom_gesture(20.0, (100.0, 100.0));
        assert_eq!(m.transform().k, 6.0);
    }

    #[test]
    fn hover_a_then_b_shows_b_title() {
        let mut person_b = PersonRecord::new("B", "Seattle");
        person_b.role = Some("Engineer".into());
        let mut m = map(&[PersonRecord::new("A", "Pune"), person_b], failed());
        m.pointer_enter(0);
        m.pointer_enter(1);
        m.pointer_leave(0);
        assert_eq!(m.hover(), Hover::Marker(1));
        assert_eq!(m.status(), "B — Engineer (Seattle)");
    }

    #[test]
    fn mouse_over_pin_sets_hover() {
        let mut m = map(&[PersonRecord::new("Jane", "Pune, India")], failed());
        let area = Area { top: 1, cols: 110, rows: 13 };
        let mut term = Terminal::with_size(110, 14);
        m.render(&mut term, area);

        let (px, py) = m.viewport.to_canvas(&m.transform(), m.pins()[0]);
        let over = MouseEvent {
            kind: MouseEventKind::Moved,
            column: (px / 2.0) as u16,
            row: 1 + (py / 4.0) as u16,
            modifiers: KeyModifiers::NONE,
        };
        m.handle_mouse(&over, area);
        assert_eq!(m.hover(), Hover::Marker(0));

        let away = MouseEvent { column: 0, row: 1, ..over };
        m.handle_mouse(&away, area);
        assert_eq!(m.hover(), Hover::None);
    }

    #[test]
    fn wheel_zooms_and_reset_restores_identity() {
        let mut m = map(&[], failed());
        let area = Area { top: 0, cols: 110, rows: 13 };
        let mut term = Terminal::with_size(110, 13);
        m.render(&mut term, area);
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 30,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        for _ in 0..40 {
            m.handle_mouse(&wheel, area);
        }
        assert_eq!(m.transform().k, 6.0);
        m.handle_key(KeyCode::Char('0'), KeyModifiers::NONE);
        assert_eq!(m.transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn late_landmass_arrives_through_poll() {
        let mut m = MapView::with_loader(
            &[PersonRecord::new("Jane", "Pune")],
            &LocationResolver::default(),
            MapConfig::default(),
            AssetLoader::spawn("landmass", || Landmass::load(&AssetSource::Bundled)),
        );
        for _ in 0..400 {
            if m.poll_assets() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(m.projected_land().is_some());
        assert!(!m.projected_land().unwrap().dots.is_empty());
    }

    #[test]
    fn failed_landmass_through_poll_keeps_pins() {
        let mut m = MapView::with_loader(
            &[PersonRecord::new("Jane", "Pune")],
            &LocationResolver::default(),
            MapConfig::default(),
            AssetLoader::spawn("landmass", || Err(AtlasError::Landmass("offline".into()))),
        );
        for _ in 0..400 {
            if m.poll_assets() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(m.projected_land().is_none());
        assert_eq!(m.pins().len(), 1);
    }

    #[test]
    fn viewport_meets_and_centers() {
        let vp = Viewport::fit(440, 100);
        assert!((vp.scale - 0.1).abs() < 1e-12);
        assert!((vp.ox - 110.0).abs() < 1e-9);
        assert_eq!(vp.oy, 0.0);
        assert_eq!(vp.to_canvas(&ZoomTransform::IDENTITY, (0.0, 0.0)), (vp.ox, vp.oy));
        let back = vp.to_view_box(vp.to_canvas(&ZoomTransform::IDENTITY, (1100.0, 500.0)));
        assert!((back.0 - 1100.0).abs() < 1e-9 && (back.1 - 500.0).abs() < 1e-9);
    }
}
