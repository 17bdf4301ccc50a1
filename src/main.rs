mod app;
mod assets;
mod braille;
mod config;
mod error;
mod geo;
mod help;
mod hover;
mod logging;
mod navbar;
mod projection;
mod resolver;
mod settings;
mod svg;
mod terminal;
mod viz;
mod zoom;

use app::{App, ViewKind};
use assets::{AssetLoader, Landmass, LoadState};
use clap::{Parser, Subcommand};
use config::{resolve_accent, GlobeConfig, MapConfig};
use error::AtlasError;
use logging::{init_logging, LogTarget, Verbosity};
use resolver::{LocationResolver, LocationTable};
use settings::Settings;
use std::fs;
use std::path::PathBuf;
use zoom::{ZoomController, ZoomTransform};

#[derive(Parser)]
#[command(name = "alumni-atlas")]
#[command(version = "0.1.0")]
#[command(about = "Globe and world map of where the team's alumni are", long_about = None)]
struct Cli {
    /// Roster file ([[person]] tables); defaults to the config value, then the demo roster
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Config file (default: ~/.config/alumni-atlas/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pin and marker color, #rrggbb
    #[arg(long, global = true)]
    accent: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log file for the interactive views
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rotating globe with a marker per alumnus
    Globe,

    /// Flat world map with pan and zoom
    Map,

    /// Resolve location strings (or the whole roster) to coordinates
    Resolve {
        /// Location strings; the roster is used when none are given
        text: Vec<String>,
    },

    /// Write the map as an SVG document
    Svg {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Zoom scale (clamped to the configured range)
        #[arg(short, long, default_value = "1.0")]
        zoom: f64,

        /// Horizontal pan in view box units
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        pan_x: f64,

        /// Vertical pan in view box units
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        pan_y: f64,
    },
}

impl Commands {
    fn is_interactive(&self) -> bool {
        matches!(self, Commands::Globe | Commands::Map)
    }
}

/// Default log file for interactive runs, under the user cache dir
fn default_log_file() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("alumni-atlas");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("alumni-atlas.log"))
}

fn main() -> Result<(), AtlasError> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    let target = if cli.command.is_interactive() {
        cli.log_file.clone().or_else(default_log_file).map_or(LogTarget::Off, LogTarget::File)
    } else {
        match cli.log_file.clone() {
            Some(path) => LogTarget::File(path),
            None => LogTarget::Stderr,
        }
    };
    init_logging(verbosity, target)?;

    let settings = Settings::load(cli.config.as_deref());
    let resolver = LocationResolver::new(LocationTable::with_extra(settings.locations.clone()));
    let roster_path = cli.roster.clone().or_else(|| settings.roster.clone());
    let people = geo::load_roster(roster_path.as_deref())?;
    tracing::info!(people = people.len(), places = resolver.table().len(), "roster ready");

    let accent = resolve_accent(cli.accent.as_deref(), &settings);
    let globe_config = GlobeConfig::from_settings(&settings, accent);
    let map_config = MapConfig::from_settings(&settings, accent);

    match cli.command {
        Commands::Globe => {
            App::new(people, resolver, globe_config, map_config, ViewKind::Globe).run()?;
        }
        Commands::Map => {
            App::new(people, resolver, globe_config, map_config, ViewKind::Map).run()?;
        }
        Commands::Resolve { text } => {
            if text.is_empty() {
                for person in &people {
                    match resolver.resolve(&person.location) {
                        Some(c) => println!("{} ({}) → {:.4}, {:.4}", person.name, person.location, c.lat, c.lng),
                        None => println!("{} ({}) → not found", person.name, person.location),
                    }
                }
            } else {
                for t in &text {
                    match resolver.resolve(t) {
                        Some(c) => println!("{} → {:.4}, {:.4}", t, c.lat, c.lng),
                        None => println!("{} → not found", t),
                    }
                }
            }
        }
        Commands::Svg { out, zoom, pan_x, pan_y } => {
            let source = map_config.landmass.clone();
            let land = match AssetLoader::spawn("landmass", move || Landmass::load(&source)).wait() {
                LoadState::Ready(land) => Some(land),
                _ => None,
            };

            let mut controller = ZoomController::new(map_config.min_zoom, map_config.max_zoom);
            controller.set(ZoomTransform { k: zoom, x: pan_x, y: pan_y });

            let points = resolver.resolve_all(&people);
            let document = svg::render_svg(&points, land.as_ref(), &map_config, controller.transform());
            fs::write(&out, document).map_err(|source| AtlasError::Io { path: out.clone(), source })?;
            println!("Wrote {} pins to {}", points.len(), out.display());
        }
    }

    Ok(())
}
