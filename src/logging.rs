//! Logging setup
//!
//! The interactive views own the terminal, so log lines there go to a file
//! (or nowhere). One-shot commands log to stderr.

use crate::error::AtlasError;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and above
    #[default]
    Normal,
    /// Info and above
    Verbose,
    /// Everything down to debug
    Debug,
    Trace,
}

impl Verbosity {
    /// From the number of `-v` flags and `-q`
    pub fn from_flags(count: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    pub fn to_level(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Where log lines end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Off,
}

/// Install the global subscriber. `RUST_LOG` overrides `verbosity`.
/// Calling it again is harmless; the first subscriber stays.
pub fn init_logging(verbosity: Verbosity, target: LogTarget) -> Result<(), AtlasError> {
    let default_filter = format!("alumni_atlas={}", verbosity.to_level());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let stderr_layer = (target == LogTarget::Stderr).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
    });

    let file_layer = match &target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| AtlasError::Io { path: path.clone(), source })?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        _ => None,
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(Verbosity::Quiet.to_level(), Level::ERROR);
        assert_eq!(Verbosity::default().to_level(), Level::WARN);
        assert_eq!(Verbosity::Verbose.to_level(), Level::INFO);
        assert_eq!(Verbosity::Debug.to_level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level(), Level::TRACE);
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(2, false), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(9, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(0, true), Verbosity::Quiet);
    }

    #[test]
    fn init_logging_to_file_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.log");
        init_logging(Verbosity::Debug, LogTarget::File(path.clone())).unwrap();
        assert!(path.exists());
        init_logging(Verbosity::Normal, LogTarget::Off).unwrap();
    }

    #[test]
    fn unwritable_log_file_is_error() {
        let result = init_logging(Verbosity::Normal, LogTarget::File("/nonexistent/dir/atlas.log".into()));
        assert!(matches!(result, Err(AtlasError::Io { .. })));
    }
}
