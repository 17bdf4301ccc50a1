//! Pan/zoom transform for the map

/// `screen = k * view + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0, y: 0.0 };

    pub fn apply(&self, (vx, vy): (f64, f64)) -> (f64, f64) {
        (vx * self.k + self.x, vy * self.k + self.y)
    }

    pub fn invert(&self, (sx, sy): (f64, f64)) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    /// SVG `transform` attribute value
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Owns the transform and keeps its scale inside `[min_k, max_k]`
#[derive(Debug, Clone)]
pub struct ZoomController {
    transform: ZoomTransform,
    min_k: f64,
    max_k: f64,
}

impl ZoomController {
    pub fn new(min_k: f64, max_k: f64) -> Self {
        let (min_k, max_k) = if min_k <= max_k { (min_k, max_k) } else { (max_k, min_k) };
        Self { transform: ZoomTransform::IDENTITY, min_k, max_k }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }

    /// Zoom to scale `k` keeping the view point under `anchor` (screen space) fixed
    /// Non-finite requests are ignored.
    pub fn zoom_to(&mut self, k: f64, anchor: (f64, f64)) {
        if !k.is_finite() || !anchor.0.is_finite() || !anchor.1.is_finite() {
            return;
        }
        let k = k.clamp(self.min_k, self.max_k);
        let (vx, vy) = self.transform.invert(anchor);
        self.transform = ZoomTransform {
            k,
            x: anchor.0 - vx * k,
            y: anchor.1 - vy * k,
        };
    }

    /// Multiply the current scale by `factor` about `anchor`
    pub fn zoom_by(&mut self, factor: f64, anchor: (f64, f64)) {
        self.zoom_to(self.transform.k * factor, anchor);
    }

    /// Move by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Replace the transform wholesale, clamping its scale
    pub fn set(&mut self, transform: ZoomTransform) {
        if !(transform.k.is_finite() && transform.x.is_finite() && transform.y.is_finite()) {
            return;
        }
        self.transform = ZoomTransform {
            k: transform.k.clamp(self.min_k, self.max_k),
            ..transform
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_identity() {
        let z = ZoomController::new(1.0, 6.0);
        assert_eq!(z.transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn scale_is_clamped() {
        let mut z = ZoomController::new(1.0, 6.0);
        z.zoom_to(20.0, (0.0, 0.0));
        assert_eq!(z.transform().k, 6.0);
        z.zoom_to(0.1, (0.0, 0.0));
        assert_eq!(z.transform().k, 1.0);
        z.zoom_by(4.0, (0.0, 0.0));
        z.zoom_by(4.0, (0.0, 0.0));
        assert_eq!(z.transform().k, 6.0);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut z = ZoomController::new(1.0, 6.0);
        let anchor = (300.0, 120.0);
        let before = z.transform().invert(anchor);
        z.zoom_by(2.5, anchor);
        let after = z.transform().invert(anchor);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn pan_then_reset() {
        let mut z = ZoomController::new(1.0, 6.0);
        z.pan(10.0, -4.0);
        assert_eq!(z.transform().apply((0.0, 0.0)), (10.0, -4.0));
        z.reset();
        assert_eq!(z.transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn set_clamps_scale() {
        let mut z = ZoomController::new(1.0, 6.0);
        z.set(ZoomTransform { k: 20.0, x: 5.0, y: 6.0 });
        assert_eq!(z.transform(), ZoomTransform { k: 6.0, x: 5.0, y: 6.0 });
    }

    #[test]
    fn non_finite_requests_are_ignored() {
        let mut z = ZoomController::new(1.0, 6.0);
        z.zoom_to(2.0, (10.0, 10.0));
        let before = z.transform();
        z.zoom_to(f64::NAN, (0.0, 0.0));
        z.zoom_by(f64::INFINITY, (0.0, 0.0));
        z.zoom_to(3.0, (f64::NAN, 0.0));
        z.set(ZoomTransform { k: f64::NAN, x: 0.0, y: 0.0 });
        assert_eq!(z.transform(), before);
    }

    #[test]
    fn svg_transform_string() {
        let t = ZoomTransform { k: 2.0, x: -10.0, y: 5.5 };
        assert_eq!(t.to_svg(), "translate(-10,5.5) scale(2)");
    }
}
