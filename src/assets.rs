//! Best-effort background loading of the landmass outline and globe texture

use crate::error::AtlasError;
use crate::projection::GeoBounds;
use image::imageops::FilterType;
use image::{GrayAlphaImage, RgbaImage};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Landmass outline compiled into the binary
const BUNDLED_LANDMASS: &str = include_str!("../assets/land.geojson");

/// Upper bound on downloaded assets (20MB)
const MAX_DOWNLOAD_SIZE: u64 = 20 * 1024 * 1024;

/// Alpha or brightness at which a texture pixel counts as outline
const OUTLINE_THRESHOLD: u8 = 96;

/// Tooltip portrait edge in pixels: one cell per column, two pixels per row
pub const AVATAR_SIZE: u32 = 8;

/// Where an asset comes from
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSource {
    Bundled,
    Path(PathBuf),
    Url(String),
}

impl AssetSource {
    /// `"bundled"`, an http(s) URL, or a filesystem path
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("bundled") {
            AssetSource::Bundled
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            AssetSource::Url(trimmed.to_string())
        } else {
            AssetSource::Path(PathBuf::from(trimmed))
        }
    }

    fn describe(&self) -> String {
        match self {
            AssetSource::Bundled => "<bundled>".to_string(),
            AssetSource::Path(p) => p.display().to_string(),
            AssetSource::Url(u) => u.clone(),
        }
    }

    fn read_bytes(&self, bundled: &'static [u8]) -> Result<Vec<u8>, AtlasError> {
        match self {
            AssetSource::Bundled => Ok(bundled.to_vec()),
            AssetSource::Path(path) => std::fs::read(path).map_err(|source| AtlasError::Io {
                path: path.clone(),
                source,
            }),
            AssetSource::Url(url) => fetch(url),
        }
    }
}

fn fetch(url: &str) -> Result<Vec<u8>, AtlasError> {
    let fail = |reason: String| AtlasError::Fetch { url: url.to_string(), reason };
    let resp = ureq::get(url)
        .timeout(Duration::from_secs(10))
        .call()
        .map_err(|e| fail(e.to_string()))?;
    let mut bytes = Vec::new();
    resp.into_reader()
        .take(MAX_DOWNLOAD_SIZE)
        .read_to_end(&mut bytes)
        .map_err(|e| fail(e.to_string()))?;
    Ok(bytes)
}

/// Where a background load stands
#[derive(Debug)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed,
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// One-shot loader: work runs on its own thread, the owning view polls.
/// Dropping the loader marks it unmounted so a late result is discarded.
pub struct AssetLoader<T> {
    state: LoadState<T>,
    receiver: Option<Receiver<Result<T, AtlasError>>>,
    mounted: Arc<AtomicBool>,
    name: &'static str,
}

impl<T: Send + 'static> AssetLoader<T> {
    pub fn spawn<F>(name: &'static str, load: F) -> Self
    where
        F: FnOnce() -> Result<T, AtlasError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let mounted = Arc::new(AtomicBool::new(true));
        let still_mounted = mounted.clone();

        thread::spawn(move || {
            let result = load();
            if still_mounted.load(Ordering::Relaxed) {
                let _ = tx.send(result);
            }
        });

        Self {
            state: LoadState::Loading,
            receiver: Some(rx),
            mounted,
            name,
        }
    }

    /// Loader that has already finished, for sources known up front
    pub fn settled(name: &'static str, state: LoadState<T>) -> Self {
        Self {
            state,
            receiver: None,
            mounted: Arc::new(AtomicBool::new(true)),
            name,
        }
    }

    /// Pick up a finished load; returns true when the state just changed
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.receiver else {
            return false;
        };
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(AtlasError::LoaderGone),
        };
        self.receiver = None;
        self.state = match outcome {
            Ok(value) => {
                tracing::debug!(asset = self.name, "asset loaded");
                LoadState::Ready(value)
            }
            Err(e) => {
                tracing::warn!(asset = self.name, error = %e, "asset unavailable, using fallback");
                LoadState::Failed
            }
        };
        true
    }

    /// Block until the load settles (non-interactive callers)
    pub fn wait(mut self) -> LoadState<T> {
        if let Some(rx) = self.receiver.take() {
            self.state = match rx.recv() {
                Ok(Ok(value)) => LoadState::Ready(value),
                Ok(Err(e)) => {
                    tracing::warn!(asset = self.name, error = %e, "asset unavailable, using fallback");
                    LoadState::Failed
                }
                Err(_) => LoadState::Failed,
            };
        }
        std::mem::replace(&mut self.state, LoadState::Failed)
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }
}

impl<T> Drop for AssetLoader<T> {
    fn drop(&mut self) {
        self.mounted.store(false, Ordering::Relaxed);
    }
}

/// Land polygons as rings of (lng, lat) in degrees
#[derive(Debug, Clone)]
pub struct Landmass {
    pub rings: Vec<Vec<(f64, f64)>>,
    pub bounds: GeoBounds,
}

impl Landmass {
    /// Read `Polygon` and `MultiPolygon` features from a GeoJSON FeatureCollection
    pub fn from_geojson(json: &str) -> Result<Self, AtlasError> {
        let v: Value = serde_json::from_str(json).map_err(|e| AtlasError::Landmass(e.to_string()))?;
        let features = v["features"]
            .as_array()
            .ok_or_else(|| AtlasError::Landmass("no features array".to_string()))?;

        let mut rings = Vec::new();
        for feat in features {
            let geom = &feat["geometry"];
            match geom["type"].as_str() {
                Some("Polygon") => push_polygon(&geom["coordinates"], &mut rings),
                Some("MultiPolygon") => {
                    if let Some(polys) = geom["coordinates"].as_array() {
                        for poly in polys {
                            push_polygon(poly, &mut rings);
                        }
                    }
                }
                _ => {}
            }
        }

        let bounds = GeoBounds::of_points(rings.iter().flatten())
            .ok_or_else(|| AtlasError::Landmass("no polygon coordinates".to_string()))?;
        Ok(Self { rings, bounds })
    }

    pub fn load(source: &AssetSource) -> Result<Self, AtlasError> {
        let bytes = source.read_bytes(BUNDLED_LANDMASS.as_bytes())?;
        let text = String::from_utf8(bytes)
            .map_err(|e| AtlasError::Landmass(format!("{}: {}", source.describe(), e)))?;
        Self::from_geojson(&text)
    }
}

fn push_polygon(poly: &Value, rings: &mut Vec<Vec<(f64, f64)>>) {
    let Some(poly_rings) = poly.as_array() else {
        return;
    };
    for ring in poly_rings {
        if let Some(points) = ring.as_array() {
            let coords: Vec<(f64, f64)> = points
                .iter()
                .filter_map(|p| {
                    let a = p.as_array()?;
                    Some((a.first()?.as_f64()?, a.get(1)?.as_f64()?))
                })
                .collect();
            if coords.len() >= 3 {
                rings.push(coords);
            }
        }
    }
}

/// Even-odd point-in-polygon over all rings (holes subtract)
pub fn point_in_rings<'a, I>(rings: I, x: f64, y: f64) -> bool
where
    I: IntoIterator<Item = &'a [(f64, f64)]>,
{
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

/// Equirectangular outline texture reduced to an on/off mask
pub struct OutlineTexture {
    mask: GrayAlphaImage,
}

impl OutlineTexture {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AtlasError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self { mask: img.to_luma_alpha8() })
    }

    pub fn load(source: &AssetSource) -> Result<Self, AtlasError> {
        Self::from_bytes(&source.read_bytes(&[])?)
    }

    /// Whether the texel at (lat, lng) is part of the outline; wraps horizontally
    pub fn is_outline(&self, lat: f64, lng: f64) -> bool {
        let (w, h) = self.mask.dimensions();
        if w == 0 || h == 0 {
            return false;
        }
        let u = ((lng + 180.0) / 360.0).rem_euclid(1.0);
        let v = ((90.0 - lat) / 180.0).clamp(0.0, 1.0);
        let x = ((u * w as f64) as u32).min(w - 1);
        let y = ((v * h as f64) as u32).min(h - 1);
        let px = self.mask.get_pixel(x, y);
        px[1] >= OUTLINE_THRESHOLD && px[0] >= OUTLINE_THRESHOLD
    }
}

/// Portrait from a roster `image`, scaled down for half-block drawing
pub struct Avatar {
    pub rgba: RgbaImage,
}

impl Avatar {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AtlasError> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle).to_rgba8();
        Ok(Self { rgba })
    }

    pub fn load(source: &AssetSource) -> Result<Self, AtlasError> {
        Self::from_bytes(&source.read_bytes(&[])?)
    }
}
