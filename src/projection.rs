//! Globe and map projections

use crate::geo::GeoCoordinate;

/// Globe radius in scene units
pub const GLOBE_RADIUS: f64 = 1.2;

/// Markers float this much above the surface (relative to the radius)
pub const MARKER_LIFT: f64 = 1.01;

/// Map view box
pub const VIEW_WIDTH: f64 = 2200.0;
pub const VIEW_HEIGHT: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

/// Physics convention: polar angle from the north pole, azimuth from lng + 180
pub fn lat_lng_to_xyz(coord: GeoCoordinate, radius: f64) -> Vec3 {
    let phi = (90.0 - coord.lat).to_radians();
    let theta = (coord.lng + 180.0).to_radians();
    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`lat_lng_to_xyz`] for any point off the origin
pub fn xyz_to_lat_lng(p: Vec3) -> GeoCoordinate {
    let r = p.length();
    let phi = (p.y / r).clamp(-1.0, 1.0).acos();
    let theta = p.z.atan2(-p.x);
    let mut lng = theta.to_degrees() - 180.0;
    if lng < -180.0 {
        lng += 360.0;
    }
    GeoCoordinate::new(90.0 - phi.to_degrees(), lng)
}

/// Marker position for a coordinate on the default globe
pub fn marker_position(coord: GeoCoordinate) -> Vec3 {
    lat_lng_to_xyz(coord, GLOBE_RADIUS).scale(MARKER_LIFT)
}

/// Raw linear map: lng -180..180 to 0..width, lat 90..-90 to 0..height
pub fn linear_project(coord: GeoCoordinate, width: f64, height: f64) -> (f64, f64) {
    let x = (coord.lng + 180.0) / 360.0 * width;
    let y = (90.0 - coord.lat) / 180.0 * height;
    (x, y)
}

/// lng/lat extent of a dataset, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    #[cfg(test)]
    pub fn world() -> Self {
        Self { min_lng: -180.0, min_lat: -90.0, max_lng: 180.0, max_lat: 90.0 }
    }

    /// Bounds of a set of (lng, lat) points; `None` when empty
    pub fn of_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a (f64, f64)>,
    {
        let mut bounds: Option<Self> = None;
        for &(lng, lat) in points {
            bounds = Some(match bounds {
                None => Self { min_lng: lng, min_lat: lat, max_lng: lng, max_lat: lat },
                Some(b) => Self {
                    min_lng: b.min_lng.min(lng),
                    min_lat: b.min_lat.min(lat),
                    max_lng: b.max_lng.max(lng),
                    max_lat: b.max_lat.max(lat),
                },
            });
        }
        bounds
    }
}

/// Equirectangular projection `x = k*lng + tx`, `y = -k*lat + ty` (radians in)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedEquirectangular {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl FittedEquirectangular {
    /// Largest uniform scale that fits `bounds` inside `width x height`, centered
    pub fn fit_size(bounds: GeoBounds, width: f64, height: f64) -> Self {
        let x0 = bounds.min_lng.to_radians();
        let x1 = bounds.max_lng.to_radians();
        // y grows downwards, so the northern edge is the smaller y
        let y0 = -bounds.max_lat.to_radians();
        let y1 = -bounds.min_lat.to_radians();

        let dx = (x1 - x0).max(f64::EPSILON);
        let dy = (y1 - y0).max(f64::EPSILON);
        let scale = (width / dx).min(height / dy);
        Self {
            scale,
            tx: (width - scale * (x1 + x0)) / 2.0,
            ty: (height - scale * (y1 + y0)) / 2.0,
        }
    }

    pub fn project(&self, lng: f64, lat: f64) -> (f64, f64) {
        (
            self.scale * lng.to_radians() + self.tx,
            -self.scale * lat.to_radians() + self.ty,
        )
    }

    pub fn project_coord(&self, coord: GeoCoordinate) -> (f64, f64) {
        self.project(coord.lng, coord.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn poles_and_equator() {
        let north = lat_lng_to_xyz(GeoCoordinate::new(90.0, 0.0), 1.0);
        assert!(close(north.y, 1.0) && close(north.x, 0.0) && close(north.z, 0.0));

        // lng 0 sits on +x, lng 90 on -z
        let greenwich = lat_lng_to_xyz(GeoCoordinate::new(0.0, 0.0), 2.0);
        assert!(close(greenwich.x, 2.0) && close(greenwich.y, 0.0) && close(greenwich.z, 0.0));
        let east = lat_lng_to_xyz(GeoCoordinate::new(0.0, 90.0), 1.0);
        assert!(close(east.z, -1.0));
    }

    #[test]
    fn marker_is_lifted_off_surface() {
        let p = marker_position(GeoCoordinate::new(18.5204, 73.8567));
        assert!(close(p.length(), GLOBE_RADIUS * MARKER_LIFT));
    }

    #[test]
    fn inverse_recovers_coordinate() {
        for &(lat, lng) in &[(18.5204, 73.8567), (-33.9, 151.2), (47.6, -122.3), (0.0, 179.5)] {
            let c = xyz_to_lat_lng(lat_lng_to_xyz(GeoCoordinate::new(lat, lng), 1.2));
            assert!((c.lat - lat).abs() < 1e-6, "lat {lat}");
            assert!((c.lng - lng).abs() < 1e-6, "lng {lng}");
        }
    }

    #[test]
    fn linear_corners() {
        assert_eq!(linear_project(GeoCoordinate::new(90.0, -180.0), 2200.0, 1000.0), (0.0, 0.0));
        assert_eq!(linear_project(GeoCoordinate::new(-90.0, 180.0), 2200.0, 1000.0), (2200.0, 1000.0));
        assert_eq!(linear_project(GeoCoordinate::new(0.0, 0.0), 2200.0, 1000.0), (1100.0, 500.0));
    }

    #[test]
    fn fit_whole_world_is_height_bound_and_centered() {
        let p = FittedEquirectangular::fit_size(GeoBounds::world(), VIEW_WIDTH, VIEW_HEIGHT);
        // 2:1 world into a 2.2:1 box: height limits the scale
        assert!(close(p.scale, VIEW_HEIGHT / std::f64::consts::PI));
        let (x0, y0) = p.project(-180.0, 90.0);
        let (x1, y1) = p.project(180.0, -90.0);
        assert!(close(y0, 0.0) && close(y1, VIEW_HEIGHT));
        assert!(close(x0, VIEW_WIDTH - x1));
        assert!(x0 > 0.0);
    }

    #[test]
    fn fitted_and_linear_differ_for_partial_world() {
        let bounds = GeoBounds { min_lng: -180.0, min_lat: -60.0, max_lng: 180.0, max_lat: 84.0 };
        let fitted = FittedEquirectangular::fit_size(bounds, VIEW_WIDTH, VIEW_HEIGHT);
        let pune = GeoCoordinate::new(18.5204, 73.8567);
        let (fx, fy) = fitted.project_coord(pune);
        let (lx, ly) = linear_project(pune, VIEW_WIDTH, VIEW_HEIGHT);
        assert!((fx - lx).abs() > 1.0 || (fy - ly).abs() > 1.0);
    }

    #[test]
    fn bounds_of_points() {
        let pts = [(10.0, 5.0), (-20.0, 40.0), (3.0, -7.0)];
        let b = GeoBounds::of_points(pts.iter()).unwrap();
        assert_eq!(b, GeoBounds { min_lng: -20.0, min_lat: -7.0, max_lng: 10.0, max_lat: 40.0 });
        assert!(GeoBounds::of_points([].iter()).is_none());
    }
}
