use crate::geo::GeoCoordinate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub roster: Option<PathBuf>,
    pub accent: Option<String>,
    #[serde(default)]
    pub globe: GlobeSettings,
    #[serde(default)]
    pub map: MapSettings,
    /// Extra place names for the location table
    #[serde(default)]
    pub locations: BTreeMap<String, GeoCoordinate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobeSettings {
    pub texture: Option<String>,          // Path or URL of an equirectangular outline PNG
    pub camera_distance: Option<f64>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapSettings {
    pub landmass: Option<String>,         // "bundled", path or URL of a GeoJSON FeatureCollection
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub pin_projection: Option<String>,   // "linear" or "fitted"
}

impl Settings {
    /// Load from `path`, or the default config location. A missing file gives
    /// defaults; a broken one is logged and also gives defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("alumni-atlas")
            .join("config.toml")
    }
}
