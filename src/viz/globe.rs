//! Rotating 3D globe with a marker per alumnus

use super::{cycle_index, layer_color, render_tooltip, tooltip_lines, AlumniView, Area};
use crate::assets::{AssetLoader, AssetSource, Avatar, LoadState, OutlineTexture};
use crate::braille::{BrailleCanvas, LAYER_GRID, LAYER_HOVER, LAYER_LAND, LAYER_MARKER};
use crate::config::GlobeConfig;
use crate::geo::{GeoCoordinate, PersonRecord, ResolvedPoint};
use crate::hover::{hit_test, Hover, PointerTracker};
use crate::projection::{lat_lng_to_xyz, marker_position, xyz_to_lat_lng, Vec3, GLOBE_RADIUS};
use crate::resolver::LocationResolver;
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::collections::HashMap;

/// Vertical field of view
const FOV_DEG: f64 = 45.0;

/// Wireframe shell sits just above the surface
const WIREFRAME_RADIUS: f64 = 1.205;

/// Marker sphere radius in scene units
const MARKER_SIZE: f64 = 0.02;

const ROTATE_STEP: f64 = 0.08;
const DRAG_SPEED: f64 = 0.04;
const ZOOM_STEP: f64 = 1.1;
const PITCH_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 0.05;

const HELP: &str = "\
GLOBE
─────────────────
←/→ h/l  Rotate
↑/↓ k/j  Tilt
drag     Orbit
+/- wheel Zoom
0        Reset view
Tab      Next alumnus
Esc      Clear hover";

/// Orbit camera looking at the origin from +z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f64,
    pub pitch: f64,
    pub distance: f64,
}

/// A point projected to canvas dots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl Camera {
    /// World to view space: yaw about Y, then pitch about X
    pub fn to_view(&self, p: Vec3) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let x = p.x * cy + p.z * sy;
        let z = -p.x * sy + p.z * cy;
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(x, p.y * cp - z * sp, p.y * sp + z * cp)
    }

    pub fn to_world(&self, v: Vec3) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let y = v.y * cp + v.z * sp;
        let z = -v.y * sp + v.z * cp;
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(v.x * cy - z * sy, y, v.x * sy + z * cy)
    }

    /// A surface point faces the camera when it is in front of its tangent plane
    pub fn faces_camera(&self, view: Vec3) -> bool {
        view.z * self.distance > view.dot(view)
    }
}

/// Perspective projection onto a canvas of `width x height` dots
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    pub camera: Camera,
    pub cx: f64,
    pub cy: f64,
    pub focal: f64,
}

impl Projector {
    pub fn new(camera: Camera, width: usize, height: usize) -> Self {
        let focal = (height as f64 / 2.0) / (FOV_DEG.to_radians() / 2.0).tan();
        Self {
            camera,
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
            focal,
        }
    }

    pub fn project_view(&self, v: Vec3) -> Option<ScreenPoint> {
        let depth = self.camera.distance - v.z;
        if depth <= 1e-6 {
            return None;
        }
        Some(ScreenPoint {
            x: self.cx + self.focal * v.x / depth,
            y: self.cy - self.focal * v.y / depth,
            depth,
        })
    }

    /// Project a surface point, `None` when it is on the far side
    pub fn project_visible(&self, world: Vec3) -> Option<ScreenPoint> {
        let v = self.camera.to_view(world);
        if !self.camera.faces_camera(v) {
            return None;
        }
        self.project_view(v)
    }

    /// On-screen radius of the sphere's silhouette
    pub fn silhouette_radius(&self, radius: f64) -> f64 {
        let d = self.camera.distance;
        self.focal * radius / (d * d - radius * radius).max(1e-9).sqrt()
    }

    /// Cast a ray through canvas dot `(x, y)`; the world-space hit on the sphere
    pub fn ray_hit(&self, x: f64, y: f64, radius: f64) -> Option<Vec3> {
        let dir = Vec3::new((x - self.cx) / self.focal, -(y - self.cy) / self.focal, -1.0);
        let d = self.camera.distance;
        let a = dir.dot(dir);
        let b = -2.0 * d;
        let c = d * d - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let t = (-b - disc.sqrt()) / (2.0 * a);
        let hit = Vec3::new(dir.x * t, dir.y * t, d + dir.z * t);
        Some(self.camera.to_world(hit))
    }
}

pub struct GlobeView {
    points: Vec<ResolvedPoint>,
    markers: Vec<Vec3>,
    screen: Vec<Option<ScreenPoint>>,
    hover: Hover,
    tracker: PointerTracker,
    camera: Camera,
    config: GlobeConfig,
    texture: AssetLoader<OutlineTexture>,
    /// Portraits by point index, requested on first hover
    avatars: HashMap<usize, AssetLoader<Avatar>>,
    canvas: BrailleCanvas,
    drag_from: Option<(u16, u16)>,
}

impl GlobeView {
    pub fn new(people: &[PersonRecord], resolver: &LocationResolver, config: GlobeConfig) -> Self {
        let texture = match config.texture.clone() {
            Some(source) => AssetLoader::spawn("globe texture", move || OutlineTexture::load(&source)),
            None => AssetLoader::settled("globe texture", LoadState::Failed),
        };
        Self::with_loader(people, resolver, config, texture)
    }

    /// Build around a texture loader that is already running or settled
    pub fn with_loader(
        people: &[PersonRecord],
        resolver: &LocationResolver,
        config: GlobeConfig,
        texture: AssetLoader<OutlineTexture>,
    ) -> Self {
        let mut view = Self {
            points: Vec::new(),
            markers: Vec::new(),
            screen: Vec::new(),
            hover: Hover::None,
            tracker: PointerTracker::default(),
            camera: Camera { yaw: 0.0, pitch: 0.0, distance: config.camera_distance },
            config,
            texture,
            avatars: HashMap::new(),
            canvas: BrailleCanvas::new(0, 0),
            drag_from: None,
        };
        view.set_people(people, resolver);
        view
    }

    /// Rebuild markers from a new roster
    pub fn set_people(&mut self, people: &[PersonRecord], resolver: &LocationResolver) {
        self.points = resolver.resolve_all(people);
        self.markers = self.points.iter().map(|p| marker_position(p.coord)).collect();
        self.screen = vec![None; self.points.len()];
        self.avatars.clear();
        self.hover.clear();
        self.tracker.reset();
        tracing::debug!(markers = self.markers.len(), "globe markers rebuilt");
    }

    #[cfg(test)]
    pub fn markers(&self) -> &[Vec3] {
        &self.markers
    }

    #[cfg(test)]
    pub fn hover(&self) -> Hover {
        self.hover
    }

    #[cfg(test)]
    pub fn camera(&self) -> Camera {
        self.camera
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

    /// Start loading the portrait for point `i` if it has one and none is underway
    fn request_avatar(&mut self, i: usize) {
        if self.avatars.contains_key(&i) {
            return;
        }
        let Some(image) = self.points.get(i).and_then(|p| p.person.image.clone()) else {
            return;
        };
        let source = AssetSource::parse(&image);
        self.avatars.insert(i, AssetLoader::spawn("avatar", move || Avatar::load(&source)));
    }

    fn avatar(&self, i: usize) -> Option<&Avatar> {
        self.avatars.get(&i).and_then(|loader| loader.state().ready())
    }

    fn reset_camera(&mut self) {
        self.camera = Camera { yaw: 0.0, pitch: 0.0, distance: self.config.camera_distance };
    }

    fn rotate(&mut self, dyaw: f64, dpitch: f64) {
        self.camera.yaw = (self.camera.yaw + dyaw).rem_euclid(std::f64::consts::TAU);
        self.camera.pitch = (self.camera.pitch + dpitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    fn zoom(&mut self, factor: f64) {
        self.camera.distance =
            (self.camera.distance * factor).clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Point yaw/pitch so a coordinate faces the camera
    pub fn look_at(&mut self, coord: GeoCoordinate) {
        let p = lat_lng_to_xyz(coord, 1.0);
        self.camera.yaw = (-p.x).atan2(p.z).rem_euclid(std::f64::consts::TAU);
        let flat = (p.x * p.x + p.z * p.z).sqrt();
        self.camera.pitch = p.y.atan2(flat).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Project every marker; hidden ones become `None`
    pub fn project_markers(&mut self, width: usize, height: usize) -> &[Option<ScreenPoint>] {
        let projector = Projector::new(self.camera, width, height);
        self.screen = self.markers.iter().map(|&m| projector.project_visible(m)).collect();
        &self.screen
    }

    fn marker_radius(&self, projector: &Projector, sp: &ScreenPoint) -> f64 {
        (projector.focal * MARKER_SIZE / sp.depth).max(1.0)
    }

    /// Marker under canvas dot `(x, y)`, from the last projection
    pub fn marker_at(&self, x: f64, y: f64) -> Option<usize> {
        let targets = self
            .screen
            .iter()
            .enumerate()
            .filter_map(|(i, sp)| sp.map(|sp| (i, sp.x, sp.y)));
        hit_test(targets, x, y, 3.0)
    }
}

fn draw_polyline(canvas: &mut BrailleCanvas, projector: &Projector, coords: impl Iterator<Item = GeoCoordinate>) {
    let mut prev: Option<ScreenPoint> = None;
    for c in coords {
        let cur = projector.project_visible(lat_lng_to_xyz(c, WIREFRAME_RADIUS));
        if let (Some(a), Some(b)) = (prev, cur) {
            canvas.line(a.x, a.y, b.x, b.y, LAYER_GRID);
        }
        prev = cur;
    }
}

/// Graticule every 30 degrees, front side only
fn draw_wireframe(canvas: &mut BrailleCanvas, projector: &Projector) {
    for lat in (-60..=60).step_by(30) {
        let ring = (-180..=180).step_by(3).map(|lng| GeoCoordinate::new(lat as f64, lng as f64));
        draw_polyline(canvas, projector, ring);
    }
    for lng in (-180..180).step_by(30) {
        let meridian = (-90..=90).step_by(3).map(|lat| GeoCoordinate::new(lat as f64, lng as f64));
        draw_polyline(canvas, projector, meridian);
    }
}

/// Ray-cast every dot inside the silhouette and sample the texture there
fn draw_texture(canvas: &mut BrailleCanvas, projector: &Projector, texture: &OutlineTexture) {
    let r = projector.silhouette_radius(GLOBE_RADIUS);
    let x0 = (projector.cx - r).floor().max(0.0) as usize;
    let x1 = ((projector.cx + r).ceil().max(0.0) as usize).min(canvas.width());
    let y0 = (projector.cy - r).floor().max(0.0) as usize;
    let y1 = ((projector.cy + r).ceil().max(0.0) as usize).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let Some(hit) = projector.ray_hit(x as f64 + 0.5, y as f64 + 0.5, GLOBE_RADIUS) else {
                continue;
            };
            let c = xyz_to_lat_lng(hit);
            if texture.is_outline(c.lat, c.lng) {
                canvas.plot(x as i64, y as i64, LAYER_LAND);
            }
        }
    }
}

impl AlumniView for GlobeView {
    fn name(&self) -> &'static str {
        "globe"
    }

    fn points(&self) -> &[ResolvedPoint] {
        &self.points
    }

    fn poll_assets(&mut self) -> bool {
        let mut changed = self.texture.poll();
        for loader in self.avatars.values_mut() {
            changed |= loader.poll();
        }
        changed
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.rotate(-ROTATE_STEP, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.rotate(ROTATE_STEP, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.rotate(0.0, ROTATE_STEP),
            KeyCode::Down | KeyCode::Char('j') => self.rotate(0.0, -ROTATE_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(ZOOM_STEP),
            KeyCode::Char('0') => self.reset_camera(),
            KeyCode::Tab | KeyCode::BackTab => {
                let forward = code == KeyCode::Tab && !modifiers.contains(KeyModifiers::SHIFT);
                if let Some(next) = cycle_index(self.hover.index(), self.points.len(), forward) {
                    self.hover.enter(next);
                    self.look_at(self.points[next].coord);
                }
            }
            KeyCode::Esc => self.hover.clear(),
            _ => return false,
        }
        true
    }

    fn handle_mouse(&mut self, event: &MouseEvent, area: Area) {
        match event.kind {
            MouseEventKind::Moved => {
                let hit = area
                    .cell_to_dot(event.column, event.row)
                    .and_then(|(x, y)| self.marker_at(x, y));
                self.tracker.update(hit, &mut self.hover);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((event.column, event.row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((c0, r0)) = self.drag_from {
                    let dx = event.column as f64 - c0 as f64;
                    let dy = event.row as f64 - r0 as f64;
                    self.rotate(dx * DRAG_SPEED, dy * DRAG_SPEED * 2.0);
                }
                self.drag_from = Some((event.column, event.row));
            }
            MouseEventKind::Up(_) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.zoom(1.0 / ZOOM_STEP),
            MouseEventKind::ScrollDown => self.zoom(ZOOM_STEP),
            _ => {}
        }
    }

    fn render(&mut self, term: &mut Terminal, area: Area) {
        if self.canvas.width() != area.cols as usize * 2 || self.canvas.height() != area.rows as usize * 4 {
            self.canvas = BrailleCanvas::new(area.cols, area.rows);
        }
        self.canvas.clear();
        let projector = Projector::new(self.camera, self.canvas.width(), self.canvas.height());

        self.canvas.circle(projector.cx, projector.cy, projector.silhouette_radius(GLOBE_RADIUS), LAYER_GRID);

        match self.texture.state().ready() {
            Some(texture) => draw_texture(&mut self.canvas, &projector, texture),
            None => draw_wireframe(&mut self.canvas, &projector),
        }

        self.project_markers(self.canvas.width(), self.canvas.height());
        let hovered = self.hover.index();
        // hovered marker last so it stays on top
        let order = (0..self.screen.len()).filter(|&i| Some(i) != hovered).chain(hovered);
        for i in order {
            if let Some(sp) = self.screen[i] {
                let r = self.marker_radius(&projector, &sp);
                let layer = if Some(i) == hovered { LAYER_HOVER } else { LAYER_MARKER };
                self.canvas.disc(sp.x, sp.y, r, layer);
            }
        }

        let accent = self.config.accent;
        self.canvas.render(term, area.top, |layer| layer_color(layer, accent));

        if let Some(i) = hovered {
            self.request_avatar(i);
            if let Some(sp) = self.screen[i] {
                let (cx, cy) = area.dot_to_cell(sp.x, sp.y);
                let avatar = self.avatar(i).map(|a| &a.rgba);
                render_tooltip(term, area, cx, cy, &tooltip_lines(&self.points[i]), avatar, accent);
            }
        }
    }

    fn status(&self) -> String {
        let overlay = match self.texture.state() {
            LoadState::Loading => "loading texture",
            LoadState::Ready(_) => "textured",
            LoadState::Failed => "wireframe",
        };
        match self.hover.index() {
            Some(i) => format!("{} · {}", self.points[i].person.name, self.points[i].person.location),
            None => format!("{} alumni on the globe · {} · zoom {:.1}", self.points.len(), overlay, self.camera.distance),
        }
    }

    fn help(&self) -> &'static str {
        HELP
    }
}
