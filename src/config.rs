use crate::assets::AssetSource;
use crate::settings::Settings;
use crossterm::style::Color;

/// Default pin/marker color (#c73808)
pub const DEFAULT_ACCENT: Color = Color::Rgb { r: 0xc7, g: 0x38, b: 0x08 };

/// How map pins are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinProjection {
    /// Raw lng/lat-to-view-box formula, independent of the landmass data
    #[default]
    Linear,
    /// Same fitted projection as the outline once it has loaded
    Fitted,
}

impl PinProjection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "fitted" | "fit" => Some(Self::Fitted),
            _ => None,
        }
    }
}

/// Configuration for the globe view
#[derive(Debug, Clone)]
pub struct GlobeConfig {
    pub texture: Option<AssetSource>,
    pub camera_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub accent: Color,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            texture: None,
            camera_distance: 2.6,
            min_distance: 2.1,
            max_distance: 4.2,
            accent: DEFAULT_ACCENT,
        }
    }
}

/// Configuration for the map view
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub landmass: AssetSource,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub pin_projection: PinProjection,
    pub accent: Color,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            landmass: AssetSource::Bundled,
            min_zoom: 1.0,
            max_zoom: 6.0,
            pin_projection: PinProjection::Linear,
            accent: DEFAULT_ACCENT,
        }
    }
}

/// Parse `#rrggbb` (or `rrggbb`)
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}

/// Accent from an override (CLI) or the settings file
pub fn resolve_accent(cli: Option<&str>, settings: &Settings) -> Color {
    let Some(raw) = cli.or(settings.accent.as_deref()) else {
        return DEFAULT_ACCENT;
    };
    parse_hex_color(raw).unwrap_or_else(|| {
        tracing::warn!(accent = raw, "invalid accent color, using default");
        DEFAULT_ACCENT
    })
}

/// A configured length or scale; missing gives the default, non-finite or
/// non-positive logs a warning and gives the default
fn positive(value: Option<f64>, default: f64, key: &str) -> f64 {
    match value {
        None => default,
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            tracing::warn!(key, value = v, default, "config value must be a positive number, using default");
            default
        }
    }
}

impl GlobeConfig {
    pub fn from_settings(settings: &Settings, accent: Color) -> Self {
        let defaults = Self::default();
        let g = &settings.globe;
        let min_distance = positive(g.min_distance, defaults.min_distance, "globe.min_distance");
        let max_distance = positive(g.max_distance, defaults.max_distance, "globe.max_distance").max(min_distance);
        Self {
            texture: g.texture.as_deref().map(AssetSource::parse),
            camera_distance: positive(g.camera_distance, defaults.camera_distance, "globe.camera_distance")
                .clamp(min_distance, max_distance),
            min_distance,
            max_distance,
            accent,
        }
    }
}

impl MapConfig {
    pub fn from_settings(settings: &Settings, accent: Color) -> Self {
        let defaults = Self::default();
        let m = &settings.map;
        let pin_projection = match m.pin_projection.as_deref() {
            None => defaults.pin_projection,
            Some(raw) => PinProjection::parse(raw).unwrap_or_else(|| {
                tracing::warn!(pin_projection = raw, "unknown pin projection, using linear");
                PinProjection::Linear
            }),
        };
        Self {
            landmass: m.landmass.as_deref().map(AssetSource::parse).unwrap_or(AssetSource::Bundled),
            min_zoom: positive(m.min_zoom, defaults.min_zoom, "map.min_zoom"),
            max_zoom: positive(m.max_zoom, defaults.max_zoom, "map.max_zoom"),
            pin_projection,
            accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#c73808"), Some(DEFAULT_ACCENT));
        assert_eq!(parse_hex_color("00FF00"), Some(Color::Rgb { r: 0, g: 255, b: 0 }));
        assert_eq!(parse_hex_color("#abc"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn accent_precedence() {
        let settings = Settings::parse("accent = \"#000000\"").unwrap();
        assert_eq!(resolve_accent(Some("#ffffff"), &settings), Color::Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(resolve_accent(None, &settings), Color::Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(resolve_accent(Some("nope"), &settings), DEFAULT_ACCENT);
    }

    #[test]
    fn globe_defaults_and_clamp() {
        let cfg = GlobeConfig::from_settings(&Settings::default(), DEFAULT_ACCENT);
        assert_eq!(cfg.camera_distance, 2.6);
        assert!(cfg.texture.is_none());

        let settings = Settings::parse("[globe]\ncamera_distance = 10.0\n").unwrap();
        let cfg = GlobeConfig::from_settings(&settings, DEFAULT_ACCENT);
        assert_eq!(cfg.camera_distance, 4.2);
    }

    #[test]
    fn map_settings() {
        let settings = Settings::parse(
            "[map]\nlandmass = \"/tmp/land.json\"\npin_projection = \"fitted\"\nmax_zoom = 4.0\n",
        )
        .unwrap();
        let cfg = MapConfig::from_settings(&settings, DEFAULT_ACCENT);
        assert_eq!(cfg.landmass, AssetSource::Path("/tmp/land.json".into()));
        assert_eq!(cfg.pin_projection, PinProjection::Fitted);
        assert_eq!(cfg.max_zoom, 4.0);
        assert_eq!(cfg.min_zoom, 1.0);
    }

    #[test]
    fn non_finite_or_non_positive_values_fall_back() {
        let settings = Settings::parse("[map]\nmin_zoom = nan\nmax_zoom = inf\n").unwrap();
        let cfg = MapConfig::from_settings(&settings, DEFAULT_ACCENT);
        assert_eq!((cfg.min_zoom, cfg.max_zoom), (1.0, 6.0));

        let settings = Settings::parse("[map]\nmin_zoom = 0.0\nmax_zoom = -2.0\n").unwrap();
        let cfg = MapConfig::from_settings(&settings, DEFAULT_ACCENT);
        assert_eq!((cfg.min_zoom, cfg.max_zoom), (1.0, 6.0));

        let settings =
            Settings::parse("[globe]\nmin_distance = nan\nmax_distance = 0.0\ncamera_distance = -inf\n").unwrap();
        let cfg = GlobeConfig::from_settings(&settings, DEFAULT_ACCENT);
        assert_eq!((cfg.min_distance, cfg.max_distance, cfg.camera_distance), (2.1, 4.2, 2.6));
    }

    #[test]
    fn bad_zoom_config_still_zooms() {
        use crate::zoom::ZoomController;
        for raw in ["[map]\nmin_zoom = nan\n", "[map]\nmin_zoom = 0.0\n"] {
            let cfg = MapConfig::from_settings(&Settings::parse(raw).unwrap(), DEFAULT_ACCENT);
            let mut zoom = ZoomController::new(cfg.min_zoom, cfg.max_zoom);
            zoom.zoom_to(0.0, (10.0, 10.0));
            zoom.zoom_by(1.15, (100.0, 50.0));
            zoom.zoom_to(2.0, (300.0, 120.0));
            let t = zoom.transform();
            assert!(t.k == 2.0 && t.x.is_finite() && t.y.is_finite());
        }
    }

    #[test]
    fn unknown_pin_projection_is_linear() {
        let settings = Settings::parse("[map]\npin_projection = \"mercator\"\n").unwrap();
        assert_eq!(MapConfig::from_settings(&settings, DEFAULT_ACCENT).pin_projection, PinProjection::Linear);
    }
}
