use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by roster, config and asset loading
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid roster {path}: {source}")]
    Roster {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("invalid landmass data: {0}")]
    Landmass(String),

    #[error("failed to decode texture: {0}")]
    Texture(#[from] image::ImageError),

    #[error("asset loader stopped before reporting")]
    LoaderGone,

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
