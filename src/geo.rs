//! People, coordinates and the roster file they come from

use crate::error::AtlasError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Demo roster compiled into the binary, used when no roster file is given
const BUNDLED_ROSTER: &str = include_str!("../assets/alumni.toml");

/// Latitude/longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl GeoCoordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One person as authored in the roster
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
}

impl PersonRecord {
    #[cfg(test)]
    pub fn new(name: &str, location: &str) -> Self {
        Self {
            name: name.to_string(),
            location: location.to_string(),
            image: None,
            role: None,
            profile: None,
            batch: None,
        }
    }

    /// `Name — role (location)`, the single-line title used for map pins
    pub fn title_line(&self) -> String {
        match &self.role {
            Some(role) => format!("{} — {} ({})", self.name, role, self.location),
            None => format!("{} ({})", self.name, self.location),
        }
    }
}

/// People whose roster batch is `batch`; everyone when it is `None`
pub fn in_batch(people: &[PersonRecord], batch: Option<&str>) -> Vec<PersonRecord> {
    match batch {
        Some(b) => people.iter().filter(|p| p.batch.as_deref() == Some(b)).cloned().collect(),
        None => people.to_vec(),
    }
}

/// A person paired with the coordinate their location resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPoint {
    pub person: PersonRecord,
    pub coord: GeoCoordinate,
}

#[derive(Deserialize)]
struct RosterFile {
    #[serde(default)]
    person: Vec<PersonRecord>,
}

/// Parse a roster document (`[[person]]` tables)
pub fn parse_roster(content: &str) -> Result<Vec<PersonRecord>, toml::de::Error> {
    let file: RosterFile = toml::from_str(content)?;
    Ok(file.person)
}

/// Load the roster from `path`, or the bundled demo roster when `path` is `None`
pub fn load_roster(path: Option<&Path>) -> Result<Vec<PersonRecord>, AtlasError> {
    let Some(path) = path else {
        return parse_roster(BUNDLED_ROSTER).map_err(|source| AtlasError::Roster {
            path: "<bundled>".into(),
            source,
        });
    };

    let content = fs::read_to_string(path).map_err(|source| AtlasError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let people = parse_roster(&content).map_err(|source| AtlasError::Roster {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), count = people.len(), "loaded roster");
    Ok(people)
}
