//! Free-text location lookup against a static place table

use crate::geo::{GeoCoordinate, PersonRecord, ResolvedPoint};
use std::collections::HashMap;

/// Built-in place names, already normalized
const BUILTIN_PLACES: &[(&str, f64, f64)] = &[
    // Cities
    ("hyderabad", 17.385, 78.4867),
    ("pune", 18.5204, 73.8567),
    ("mumbai", 19.076, 72.8777),
    ("seattle", 47.6062, -122.3321),
    ("berlin", 52.52, 13.405),
    ("new haven", 41.3083, -72.9279),
    ("new york", 40.7128, -74.006),
    ("st. louis", 38.627, -90.1994),
    ("st louis", 38.627, -90.1994),
    ("boulder", 40.01499, -105.27055),
    ("fort smith", 35.3859, -94.3985),
    // Regions and countries
    ("washington", 47.7511, -120.7401),
    ("germany", 51.1657, 10.4515),
    ("india", 20.5937, 78.9629),
    ("usa", 39.8283, -98.5795),
    ("united states", 39.8283, -98.5795),
    ("unites states", 39.8283, -98.5795),
    // Compound spellings seen in rosters
    ("boulder, co", 40.01499, -105.27055),
    ("st. louis, usa", 38.627, -90.1994),
    ("pune, india", 18.5204, 73.8567),
    ("seattle, usa", 47.6062, -122.3321),
];

/// Trim and lowercase; the only normalization lookups apply
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalized place name to coordinate. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct LocationTable {
    entries: HashMap<String, GeoCoordinate>,
}

impl LocationTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN_PLACES
            .iter()
            .map(|&(name, lat, lng)| (name.to_string(), GeoCoordinate::new(lat, lng)))
            .collect();
        Self { entries }
    }

    /// Built-in entries plus operator-supplied ones (which win on conflict)
    pub fn with_extra<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, GeoCoordinate)>,
    {
        let mut table = Self::builtin();
        for (name, coord) in extra {
            if !coord.is_valid() {
                tracing::warn!(place = %name, lat = coord.lat, lng = coord.lng, "ignoring out-of-range location entry");
                continue;
            }
            table.entries.insert(normalize(&name), coord);
        }
        table
    }

    pub fn get(&self, key: &str) -> Option<GeoCoordinate> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, GeoCoordinate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Resolves roster locations. Shared by the globe, the map and the CLI.
#[derive(Debug, Clone, Default)]
pub struct LocationResolver {
    table: LocationTable,
}

impl LocationResolver {
    pub fn new(table: LocationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LocationTable {
        &self.table
    }

    /// First match wins: full string, then each comma part left to right,
    /// then the first ("city") and last ("country") parts again.
    pub fn resolve(&self, text: &str) -> Option<GeoCoordinate> {
        let raw = normalize(text);
        if let Some(coord) = self.table.get(&raw) {
            return Some(coord);
        }

        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        for part in &parts {
            if let Some(coord) = self.table.get(part) {
                return Some(coord);
            }
        }

        // Already covered by the loop above; city then country
        if parts.len() > 1 {
            let city = parts[0];
            let country = parts[parts.len() - 1];
            if let Some(coord) = self.table.get(city) {
                return Some(coord);
            }
            if let Some(coord) = self.table.get(country) {
                return Some(coord);
            }
        }

        None
    }

    /// Pair each record with its coordinate, dropping (and logging) the rest
    pub fn resolve_all(&self, people: &[PersonRecord]) -> Vec<ResolvedPoint> {
        people
            .iter()
            .filter_map(|person| match self.resolve(&person.location) {
                Some(coord) => Some(ResolvedPoint {
                    person: person.clone(),
                    coord,
                }),
                None => {
                    tracing::warn!(
                        name = %person.name,
                        location = %person.location,
                        "unknown location, add it to [locations] in config.toml"
                    );
                    None
                }
            })
            .collect()
    }
}
